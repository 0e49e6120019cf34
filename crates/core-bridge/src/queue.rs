//! Deferred work.
//!
//! Selection writes computed inside a host notification must not run inside
//! it. They are queued here and drained by the host through
//! `Coordinator::run_deferred` once its handler has returned.

use core_host::SurfaceId;
use core_selection::SelectionSnapshot;
use std::collections::VecDeque;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Replace the host selection of `surface`.
    Select {
        surface: SurfaceId,
        selection: SelectionSnapshot,
    },
}

impl Deferred {
    pub fn surface(&self) -> SurfaceId {
        match self {
            Deferred::Select { surface, .. } => *surface,
        }
    }
}

/// FIFO of deferred tasks. At most one selection write is pending per
/// surface; a newer write replaces the older one and moves to the back.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Deferred>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Deferred) {
        let surface = task.surface();
        let before = self.tasks.len();
        self.tasks.retain(|t| t.surface() != surface);
        trace!(
            target: "bridge.queue",
            surface = %surface,
            superseded = before - self.tasks.len(),
            "task_queued"
        );
        self.tasks.push_back(task);
    }

    /// Remove and return the tasks for `surface`, oldest first.
    pub fn take_for(&mut self, surface: SurfaceId) -> Vec<Deferred> {
        let (mine, rest): (VecDeque<_>, VecDeque<_>) =
            self.tasks.drain(..).partition(|t| t.surface() == surface);
        self.tasks = rest;
        mine.into()
    }

    /// Forget everything queued for `surface`.
    pub fn discard(&mut self, surface: SurfaceId) -> usize {
        self.take_for(surface).len()
    }

    pub fn pending_selection(&self, surface: SurfaceId) -> Option<&SelectionSnapshot> {
        self.tasks.iter().find_map(|t| match t {
            Deferred::Select {
                surface: s,
                selection,
            } if *s == surface => Some(selection),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
