// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! Per-thread host-runtime attachment.
//!
//! Calls that cross back into the host environment (for example a managed
//! UI runtime reached over an FFI bridge) need a thread-bound context, and
//! obtaining one is too expensive to do per call. The [`ContextCache`]
//! attaches the calling thread on first use, keeps the context in
//! thread-local storage for the thread's lifetime and relies on the
//! context's `Drop` to detach exactly once when the thread exits.

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

use tracing::debug;

use crate::Result;

/// Process-wide handle to the host environment.
///
/// Implemented by the embedder; one instance is injected at process start
/// and shared by every session.
pub trait HostRuntime: Send + Sync + 'static {
    /// Attaches the calling thread to the host environment.
    ///
    /// Called at most once per thread while an attachment is cached.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::HostAttach`] if the host refuses the
    /// attachment. The failure is not cached; a later call attaches again.
    fn attach_current_thread(&self) -> Result<Box<dyn HostContext>>;
}

/// Thread-bound context produced by a [`HostRuntime`].
///
/// Dropping the context releases the thread's attachment. The cache drops
/// it from the owning thread when that thread exits, so implementations can
/// safely perform the detach call in their `Drop`.
pub trait HostContext: Any {}

impl dyn HostContext {
    /// Downcasts the context to the embedder's concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }
}

thread_local! {
    /// Context cached for the current thread. Dropped, and thereby
    /// detached, when the thread exits.
    static ATTACHED: RefCell<Option<Box<dyn HostContext>>> = const { RefCell::new(None) };
}

/// Lazily attaches threads to the host runtime and caches the attachment.
///
/// Cloning is cheap; every clone shares the same runtime. The cache itself
/// is per thread and process-global: a thread holds at most one attachment
/// no matter how many clones exist.
#[derive(Clone)]
pub struct ContextCache {
    runtime: Arc<dyn HostRuntime>,
}

impl ContextCache {
    /// Creates a cache around the process-wide host runtime.
    pub fn new(runtime: Arc<dyn HostRuntime>) -> Self {
        Self { runtime }
    }

    /// Runs `f` with the calling thread's host context.
    ///
    /// The first call on a thread attaches it to the runtime; later calls
    /// reuse the cached context. Threads that never call this never attach.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::HostAttach`] if the thread cannot be
    /// attached. Nothing is cached in that case, so the next call attaches
    /// again.
    pub fn with_context<T>(&self, f: impl FnOnce(&dyn HostContext) -> T) -> Result<T> {
        ATTACHED.with(|cell| {
            let mut slot = cell.borrow_mut();
            if let Some(context) = slot.as_deref() {
                return Ok(f(context));
            }
            let context = self.runtime.attach_current_thread()?;
            debug!("attached current thread to the host runtime");
            let value = f(context.as_ref());
            *slot = Some(context);
            Ok(value)
        })
    }
}
