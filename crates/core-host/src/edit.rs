//! Scoped edit transaction.

use crate::{EditToken, HostError, HostSurface};
use core_selection::SelectionSnapshot;
use tracing::debug;

/// RAII guard over a host edit transaction.
///
/// Dropping the guard without calling [`Edit::commit`] rolls the surface back
/// to its pre-edit text, so early returns and `?` never leave a half-applied
/// replacement behind.
pub struct Edit<'s, S: HostSurface + ?Sized> {
    surface: &'s mut S,
    token: EditToken,
    active: bool,
    on_commit: Option<SelectionSnapshot>,
}

impl<'s, S: HostSurface + ?Sized> Edit<'s, S> {
    pub fn begin(surface: &'s mut S) -> Result<Self, HostError> {
        let token = surface.begin_edit()?;
        Ok(Self {
            surface,
            token,
            active: true,
            on_commit: None,
        })
    }

    /// Read access to the surface, reflecting edits made so far.
    pub fn surface(&self) -> &S {
        &*self.surface
    }

    pub fn replace(&mut self, range: std::ops::Range<usize>, text: &str) -> Result<(), HostError> {
        self.surface.replace(self.token, range, text)
    }

    pub fn replace_all(&mut self, text: &str) -> Result<(), HostError> {
        let len = self.surface.text_len();
        self.replace(0..len, text)
    }

    /// Install `selection` once the transaction commits. The latest call wins.
    pub fn select_on_commit(&mut self, selection: SelectionSnapshot) {
        self.on_commit = Some(selection);
    }

    /// Commit the transaction and run the selection write attached to it.
    /// Returns the host selection as installed, if a write was attached.
    pub fn commit(mut self) -> Option<SelectionSnapshot> {
        self.active = false;
        self.surface.end_edit(self.token, true);
        let selection = self.on_commit.take()?;
        self.surface.set_selection(&selection);
        Some(self.surface.selection())
    }
}

impl<'s, S: HostSurface + ?Sized> Drop for Edit<'s, S> {
    fn drop(&mut self) {
        if self.active {
            self.surface.end_edit(self.token, false);
            debug!(target: "host.edit", surface = %self.surface.id(), "edit_rolled_back");
        }
    }
}
