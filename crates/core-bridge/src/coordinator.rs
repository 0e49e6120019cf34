//! Host-facing entry points.
//!
//! The [`Coordinator`] owns the engine, the surface registry, the deferred
//! task queue, the key translator and the configuration. Hosts call one hook
//! per event and then drain deferred work with [`Coordinator::run_deferred`].
//! Hooks never fail towards the host: problems are logged and the next event
//! starts from a clean lookup.

use crate::bridge::Bridge;
use crate::panel::{Panel, PanelOutcome};
use crate::queue::{Deferred, TaskQueue};
use crate::registry::Registry;
use crate::state::{BridgeState, BridgeStateV1, CaretStyle};
use crate::BridgeError;
use core_config::Config;
use core_engine::ModalEngine;
use core_host::{HostSurface, SurfaceFlags, SurfaceId, SurfaceKey};
use core_keys::KeyTranslator;
use tracing::{debug, info, trace, warn};

pub struct Coordinator<E: ModalEngine> {
    engine: E,
    registry: Registry<BridgeState>,
    queue: TaskQueue,
    keys: KeyTranslator,
    config: Config,
}

/// Construct the state for a newly seen surface and mark the surface modal.
fn construct<S: HostSurface + ?Sized>(
    surface: &mut S,
    engine_available: bool,
    config: &Config,
    key: SurfaceKey,
) -> Result<BridgeState, BridgeError> {
    if !surface.is_valid() {
        return Err(BridgeError::SurfaceUnavailable(key.id));
    }
    if !engine_available {
        return Err(BridgeError::EngineUnavailable);
    }
    let wide = config.start_in_command_mode();
    let mut flags = surface.flags() | SurfaceFlags::INTERCEPT | SurfaceFlags::MODAL;
    flags.set(SurfaceFlags::WIDE_CARET, wide);
    surface.set_flags(flags);
    surface.set_caret_style(wide);
    Ok(BridgeState::new(key, CaretStyle::from_wide(wide)))
}

impl<E: ModalEngine> Coordinator<E> {
    pub fn new(engine: E, config: Config) -> Self {
        let keys = KeyTranslator::with_extra(config.extra_keys());
        Self {
            engine,
            registry: Registry::new(),
            queue: TaskQueue::new(),
            keys,
            config,
        }
    }

    /// Resume from a registry written with the previous state layout. This is
    /// the only place old layouts are upgraded.
    pub fn resume(engine: E, config: Config, previous: Registry<BridgeStateV1>) -> Self {
        let mut coordinator = Self::new(engine, config);
        coordinator.registry = previous.migrate();
        info!(target: "bridge.registry", surfaces = coordinator.registry.len(), "coordinator_resumed");
        coordinator
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry<BridgeState> {
        &self.registry
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Current state for `surface` without creating one.
    pub fn state<S: HostSurface + ?Sized>(&mut self, surface: &S) -> Option<&BridgeState> {
        self.registry.lookup(surface.key(), true).map(|s| &*s)
    }

    /// Owner surface of an open panel.
    pub fn owner_of(&self, panel: SurfaceId) -> Option<SurfaceId> {
        self.registry.owner_of(panel)
    }

    /// Drop the state for `id` and its engine buffer. `owns_panel` is false
    /// when `surface` is not the surface the state was built for, so its panel
    /// is left to the host and only the alias goes.
    fn release<S: HostSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: SurfaceId,
        owns_panel: bool,
    ) {
        if let Some(mut state) = self.registry.remove(id) {
            if !owns_panel {
                state.panel = None;
            }
            Bridge::new(
                &mut state,
                &mut self.engine,
                surface,
                &mut self.queue,
                &self.keys,
            )
            .close();
        }
    }

    /// Run `f` against the bridge for `surface`, constructing the state on
    /// first use. A state left behind by a previous surface with the same id
    /// is released and replaced. Failures are logged.
    fn with_bridge<S, T, F>(&mut self, surface: &mut S, hook: &'static str, f: F) -> Option<T>
    where
        S: HostSurface + ?Sized,
        F: FnOnce(&mut Bridge<'_, E, S>) -> Result<T, BridgeError>,
    {
        let id = surface.id();
        let key = surface.key();
        if !self.config.bridge_enabled() || surface.flags().contains(SurfaceFlags::PROXY) {
            return None;
        }
        if self.registry.is_stale(key) {
            debug!(target: "bridge.registry", surface = %id, "stale_state_replaced");
            self.release(surface, id, false);
        }
        let available = self.engine.is_available();
        let config = &self.config;
        let state = self
            .registry
            .get_or_insert_with(key, true, |k| construct(surface, available, config, k))?;
        let mut bridge = Bridge::new(
            state,
            &mut self.engine,
            surface,
            &mut self.queue,
            &self.keys,
        );
        match f(&mut bridge) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "bridge.coordinator", surface = %id, hook, error = %err, "hook_failed");
                None
            }
        }
    }

    /// A surface appeared (or was focused): bind it and synchronize.
    pub fn on_surface_opened<S: HostSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        self.with_bridge(surface, "opened", |bridge| bridge.activate())
            .is_some()
    }

    /// The host selection changed.
    pub fn on_selection_modified<S: HostSurface + ?Sized>(&mut self, surface: &mut S) {
        self.with_bridge(surface, "selection_modified", |bridge| bridge.sel_to_vim());
    }

    /// A key arrived on a modal surface.
    pub fn on_key<S: HostSurface + ?Sized>(&mut self, surface: &mut S, key: &str) -> bool {
        let request = self.with_bridge(surface, "key", |bridge| bridge.press(key));
        let Some(request) = request else {
            return false;
        };
        if let Some(initial) = request {
            self.open_panel(surface, initial);
        }
        true
    }

    /// A key typed into an open panel: forward it to the owning surface.
    pub fn on_panel_key<S: HostSurface + ?Sized>(
        &mut self,
        owner: &mut S,
        panel: SurfaceId,
        key: &str,
    ) -> bool {
        if self.registry.owner_of(panel) != Some(owner.id()) {
            warn!(target: "bridge.panel", panel = %panel, owner = %owner.id(), "panel_owner_mismatch");
            return false;
        }
        self.on_key(owner, key)
    }

    /// The owner's input panel closed.
    pub fn on_panel_closed<S: HostSurface + ?Sized>(
        &mut self,
        owner: &mut S,
        panel: SurfaceId,
        outcome: PanelOutcome,
    ) {
        if self.registry.owner_of(panel) != Some(owner.id()) {
            warn!(target: "bridge.panel", panel = %panel, owner = %owner.id(), "panel_owner_mismatch");
            return;
        }
        self.registry.unalias(panel);
        if let Some(state) = self.registry.lookup(owner.key(), true) {
            if state.panel == Some(panel) {
                state.panel = None;
            }
        }
        debug!(target: "bridge.panel", panel = %panel, outcome = ?outcome, "panel_finished");
        self.on_key(owner, outcome.key());
    }

    fn open_panel<S: HostSurface + ?Sized>(&mut self, surface: &mut S, initial: char) {
        let owner = surface.id();
        let Some(state) = self.registry.lookup(surface.key(), true) else {
            return;
        };
        if let Some(previous) = state.panel.take() {
            Panel::close(surface, previous);
            self.registry.unalias(previous);
        }
        match Panel::show(surface, initial) {
            Ok(panel) => {
                if let Some(state) = self.registry.lookup(surface.key(), true) {
                    state.panel = Some(panel.id);
                }
                self.registry.alias(panel.id, owner);
            }
            Err(err) => {
                warn!(target: "bridge.panel", owner = %owner, error = %err, "panel_open_failed");
            }
        }
    }

    /// The host destroyed `surface`.
    pub fn on_surface_closed<S: HostSurface + ?Sized>(&mut self, surface: &mut S) {
        let id = surface.id();
        if self.registry.contains(id) {
            let owns_panel = !self.registry.is_stale(surface.key());
            self.release(surface, id, owns_panel);
        }
    }

    /// Drain the deferred tasks for `surface`. Returns how many ran.
    pub fn run_deferred<S: HostSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let tasks = self.queue.take_for(surface.id());
        let count = tasks.len();
        for task in tasks {
            match task {
                Deferred::Select { selection, .. } => {
                    let Some(state) = self.registry.lookup(surface.key(), true) else {
                        trace!(target: "bridge.queue", surface = %surface.id(), "task_dropped");
                        continue;
                    };
                    surface.set_selection(&selection);
                    state.last_selection = Some(surface.selection());
                }
            }
        }
        count
    }

    /// Whether a bridge is bound to `surface`.
    pub fn is_bound<S: HostSurface + ?Sized>(&self, surface: &S) -> bool {
        self.registry.contains(surface.id()) && !self.registry.is_stale(surface.key())
    }
}
