// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! Surface ownership and the per-session hand-off slot.
//!
//! A session receives its rendering surface from the UI thread and consumes
//! it from the engine's notification context. The [`SurfaceSlot`] is the one
//! piece of state shared between those contexts: a mutex-guarded exchange
//! cell holding at most one pending [`SurfaceHandle`].

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, error};

/// Raw window-system value handed to the engine's render sink.
///
/// Typically a native window pointer obtained from the UI toolkit, carried
/// as an opaque integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawWindowHandle(usize);

impl RawWindowHandle {
    /// Wraps a raw window-system value.
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the wrapped value.
    pub fn raw(self) -> usize {
        self.0
    }
}

/// Owned reference to a rendering surface.
///
/// Besides the raw window value, a handle can carry a release hook that runs
/// exactly once when the handle is dropped. Embedders use the hook to give
/// back whatever keeps the underlying surface alive on the UI side, for
/// example a global reference held across the bridge.
pub struct SurfaceHandle {
    raw: RawWindowHandle,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SurfaceHandle {
    /// Creates a handle without a release hook.
    pub fn new(raw: RawWindowHandle) -> Self {
        Self { raw, release: None }
    }

    /// Creates a handle whose `release` hook runs when the handle is
    /// dropped.
    pub fn with_release(raw: RawWindowHandle, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            raw,
            release: Some(Box::new(release)),
        }
    }

    /// Returns the raw window value.
    pub fn raw(&self) -> RawWindowHandle {
        self.raw
    }
}

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

impl Drop for SurfaceHandle {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Interior state of a [`SurfaceSlot`].
enum SlotState {
    /// No surface available.
    Empty,
    /// A surface was deposited and not yet consumed.
    Pending(SurfaceHandle),
    /// The last deposited surface was taken by the notification handler.
    Consumed,
}

/// Exchange cell mediating the surface hand-off between the UI thread and
/// the engine's notification context.
///
/// The UI thread writes via [`deposit`](Self::deposit) and
/// [`release`](Self::release); the notification handler takes ownership via
/// [`take_if_present`](Self::take_if_present). Handles are dropped outside
/// the lock so release hooks never run inside the critical section.
pub(crate) struct SurfaceSlot {
    state: Mutex<SlotState>,
}

impl SurfaceSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Empty),
        }
    }

    /// Deposits a surface, replacing and releasing any pending one.
    pub(crate) fn deposit(&self, handle: SurfaceHandle) {
        let previous = {
            let Ok(mut state) = self.state.lock() else {
                error!("surface slot mutex poisoned, releasing deposited surface");
                return;
            };
            std::mem::replace(&mut *state, SlotState::Pending(handle))
        };
        if let SlotState::Pending(previous) = previous {
            debug!(surface = ?previous.raw(), "replacing pending surface");
        }
    }

    /// Takes the pending surface, if any, leaving the consumed marker
    /// behind.
    pub(crate) fn take_if_present(&self) -> Option<SurfaceHandle> {
        let Ok(mut state) = self.state.lock() else {
            error!("surface slot mutex poisoned, treating slot as empty");
            return None;
        };
        match std::mem::replace(&mut *state, SlotState::Consumed) {
            SlotState::Pending(handle) => Some(handle),
            // Only a real take leaves the consumed marker; an empty slot
            // stays empty.
            SlotState::Empty => {
                *state = SlotState::Empty;
                None
            }
            SlotState::Consumed => None,
        }
    }

    /// Clears the slot, releasing a pending surface without consuming it.
    pub(crate) fn release(&self) {
        let previous = {
            let Ok(mut state) = self.state.lock() else {
                error!("surface slot mutex poisoned, slot not cleared");
                return;
            };
            std::mem::replace(&mut *state, SlotState::Empty)
        };
        if let SlotState::Pending(previous) = previous {
            debug!(surface = ?previous.raw(), "releasing pending surface");
        }
    }

    /// Puts a consumed surface back as pending.
    ///
    /// Used when an attach was rejected. The handle is restored only while
    /// the slot still carries the consumed marker; if a newer surface was
    /// deposited or the slot was cleared in the meantime, the stale handle
    /// is released instead.
    pub(crate) fn restore(&self, handle: SurfaceHandle) {
        let Ok(mut state) = self.state.lock() else {
            error!("surface slot mutex poisoned, releasing restored surface");
            return;
        };
        if matches!(*state, SlotState::Consumed) {
            *state = SlotState::Pending(handle);
        } else {
            drop(state);
            debug!(surface = ?handle.raw(), "slot changed since take, releasing stale surface");
        }
    }

    /// Returns whether a surface is deposited and not yet consumed.
    pub(crate) fn has_pending(&self) -> bool {
        self.state
            .lock()
            .is_ok_and(|state| matches!(*state, SlotState::Pending(_)))
    }
}
