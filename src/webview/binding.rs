//! Binding between a channel and its target.
//!
//! A [`Binding`] observes the target through a `Weak` reference; it never
//! keeps the target alive. The lifecycle is one-way:
//!
//! ```text
//! Unbound ──bind──► Bound ──tear_down──► TornDown
//!    └──────────────tear_down─────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// BindingState
// ============================================================================

/// Lifecycle state of a [`Binding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// No target yet.
    Unbound,
    /// Target attached (it may since have been dropped).
    Bound,
    /// Terminal.
    TornDown,
}

enum Slot<T: ?Sized> {
    Unbound,
    Bound(Weak<T>),
    TornDown,
}

// ============================================================================
// Binding
// ============================================================================

/// Weak, lock-guarded reference from a channel to its target.
pub struct Binding<T: ?Sized> {
    slot: RwLock<Slot<T>>,
}

impl<T: ?Sized> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("state", &self.state())
            .finish()
    }
}

impl<T: ?Sized> Default for Binding<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Binding<T> {
    /// Creates an unbound binding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot::Unbound),
        }
    }

    /// Creates a binding already attached to `target`.
    #[must_use]
    pub fn bound(target: &Arc<T>) -> Self {
        Self {
            slot: RwLock::new(Slot::Bound(Arc::downgrade(target))),
        }
    }

    /// Attaches `target`.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyBound`] if a target was attached before
    /// - [`Error::BindingTornDown`] after teardown
    pub fn bind(&self, target: &Arc<T>) -> Result<()> {
        let mut slot = self.slot.write();
        match *slot {
            Slot::Unbound => {
                *slot = Slot::Bound(Arc::downgrade(target));
                Ok(())
            }
            Slot::Bound(_) => Err(Error::AlreadyBound),
            Slot::TornDown => Err(Error::BindingTornDown),
        }
    }

    /// Returns the target if it is bound and still alive.
    ///
    /// The lock is released before returning.
    #[must_use]
    pub fn target(&self) -> Option<Arc<T>> {
        match &*self.slot.read() {
            Slot::Bound(weak) => weak.upgrade(),
            Slot::Unbound | Slot::TornDown => None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BindingState {
        match *self.slot.read() {
            Slot::Unbound => BindingState::Unbound,
            Slot::Bound(_) => BindingState::Bound,
            Slot::TornDown => BindingState::TornDown,
        }
    }

    /// Returns `true` after teardown.
    #[inline]
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.state() == BindingState::TornDown
    }

    /// Clears the target permanently.
    ///
    /// Returns `false` if it was already torn down.
    pub fn tear_down(&self) -> bool {
        let mut slot = self.slot.write();
        if matches!(*slot, Slot::TornDown) {
            return false;
        }
        *slot = Slot::TornDown;
        debug!("Binding torn down");
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
