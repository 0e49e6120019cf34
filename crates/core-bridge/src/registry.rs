//! Surface registry: one state per live surface id.
//!
//! Entries are created on first use and removed only by an explicit
//! [`Registry::remove`]. Each entry remembers the identity of the surface it
//! was built for; an `exact` lookup refuses an entry whose identity no longer
//! matches (the host reused the id). Panel surfaces can be aliased to the
//! surface that owns them.

use crate::BridgeError;
use core_host::{SurfaceId, SurfaceIdentity, SurfaceKey};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, error, trace};

#[derive(Debug)]
struct Slot<S> {
    identity: SurfaceIdentity,
    state: S,
}

#[derive(Debug)]
pub struct Registry<S> {
    entries: HashMap<SurfaceId, Slot<S>>,
    /// panel id -> owner id
    aliases: HashMap<SurfaceId, SurfaceId>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.entries.contains_key(&id)
    }

    /// True when an entry exists for `key.id` but was built for another
    /// identity.
    pub fn is_stale(&self, key: SurfaceKey) -> bool {
        self.entries
            .get(&key.id)
            .is_some_and(|slot| slot.identity != key.identity)
    }

    /// Existing state only (`create = false`).
    pub fn lookup(&mut self, key: SurfaceKey, exact: bool) -> Option<&mut S> {
        let slot = self.entries.get_mut(&key.id)?;
        if exact && slot.identity != key.identity {
            trace!(target: "bridge.registry", surface = %key.id, "identity_mismatch");
            return None;
        }
        Some(&mut slot.state)
    }

    /// Existing state, or a new one from `build` (`create = true`). A failed
    /// build is logged and leaves the registry untouched.
    pub fn get_or_insert_with<F>(&mut self, key: SurfaceKey, exact: bool, build: F) -> Option<&mut S>
    where
        F: FnOnce(SurfaceKey) -> Result<S, BridgeError>,
    {
        match self.entries.entry(key.id) {
            Entry::Occupied(occupied) => {
                let slot = occupied.into_mut();
                if exact && slot.identity != key.identity {
                    trace!(target: "bridge.registry", surface = %key.id, "identity_mismatch");
                    return None;
                }
                Some(&mut slot.state)
            }
            Entry::Vacant(vacant) => match build(key) {
                Ok(state) => {
                    debug!(target: "bridge.registry", surface = %key.id, "state_created");
                    let slot = vacant.insert(Slot {
                        identity: key.identity,
                        state,
                    });
                    Some(&mut slot.state)
                }
                Err(err) => {
                    error!(target: "bridge.registry", surface = %key.id, error = %err, "bridge_construct_failed");
                    None
                }
            },
        }
    }

    /// Drop the state for `id` along with every alias pointing at it.
    pub fn remove(&mut self, id: SurfaceId) -> Option<S> {
        let slot = self.entries.remove(&id)?;
        self.aliases.retain(|_, owner| *owner != id);
        debug!(target: "bridge.registry", surface = %id, "state_removed");
        Some(slot.state)
    }

    pub fn alias(&mut self, panel: SurfaceId, owner: SurfaceId) {
        self.aliases.insert(panel, owner);
    }

    pub fn unalias(&mut self, panel: SurfaceId) -> Option<SurfaceId> {
        self.aliases.remove(&panel)
    }

    pub fn owner_of(&self, panel: SurfaceId) -> Option<SurfaceId> {
        self.aliases.get(&panel).copied()
    }

    /// Id whose state serves `id`: the owner for an aliased panel, else `id`.
    pub fn resolve(&self, id: SurfaceId) -> SurfaceId {
        self.owner_of(id).unwrap_or(id)
    }

    /// Convert every entry to a new state layout. The old registry is
    /// consumed, so no caller can observe a partially converted one.
    pub fn migrate<T: From<S>>(self) -> Registry<T> {
        let count = self.entries.len();
        let entries = self
            .entries
            .into_iter()
            .map(|(id, slot)| {
                (
                    id,
                    Slot {
                        identity: slot.identity,
                        state: T::from(slot.state),
                    },
                )
            })
            .collect();
        debug!(target: "bridge.registry", entries = count, "registry_migrated");
        Registry {
            entries,
            aliases: self.aliases,
        }
    }
}
