// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! Session lifecycle and the public controller surface.
//!
//! This module provides [`SessionController`], the entry point of the crate.
//! A session pairs one UI-side owner object with one pipeline worker thread;
//! the controller resolves opaque [`SessionToken`]s to live sessions and
//! drives every lifecycle operation through that table. Removal from the
//! table is the finalization point: any call racing with
//! [`finalize`](SessionController::finalize) observes an absent token and
//! degrades to a logged no-op.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use crate::engine::MediaEngine;
use crate::host::ContextCache;
use crate::surface::{SurfaceHandle, SurfaceSlot};
use crate::worker::{PipelineCtrl, WorkerHandle};

/// Opaque identifier for one playback session.
///
/// Returned by [`SessionController::init`] and passed back on every later
/// call. Copyable and hashable, so the embedder can store it anywhere,
/// including across an FFI boundary as a plain value. A token outliving its
/// session is harmless: operations on it become logged no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionToken(uuid::Uuid);

impl SessionToken {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Exclusively owned reference to the UI-side owner of a session.
///
/// The controller keeps the owner alive for the whole session and drops it
/// during [`SessionController::finalize`], after the worker has exited.
pub struct OwnerRef(Box<dyn Any + Send>);

impl OwnerRef {
    /// Wraps the owner object.
    pub fn new(owner: impl Any + Send) -> Self {
        Self(Box::new(owner))
    }

    /// Downcasts the owner to its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnerRef").finish_non_exhaustive()
    }
}

/// Everything the controller keeps per live session.
struct SessionRecord {
    owner: OwnerRef,
    description: String,
    slot: Arc<SurfaceSlot>,
    worker: WorkerHandle,
}

/// Bridges UI-side lifecycle calls to per-session pipeline workers.
///
/// One controller is created per process from the injected [`MediaEngine`]
/// and [`ContextCache`]; see the crate-level example for the wiring. The
/// controller is `Send + Sync`, so calls may come from any thread, though
/// embedders usually drive it from a single UI thread.
///
/// Sessions are independent of each other. The only blocking operation is
/// [`finalize`](Self::finalize), which joins the session's worker thread;
/// everything else returns without waiting for the pipeline.
pub struct SessionController<E: MediaEngine> {
    engine: Arc<E>,
    contexts: ContextCache,
    sessions: Mutex<HashMap<SessionToken, SessionRecord>>,
}

impl<E: MediaEngine> SessionController<E> {
    /// Creates a controller around the injected engine and host-runtime
    /// cache.
    pub fn new(engine: Arc<E>, contexts: ContextCache) -> Self {
        Self {
            engine,
            contexts,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a session and starts its worker.
    ///
    /// Takes exclusive ownership of `owner` for the session's lifetime and
    /// duplicates `description`; the pipeline is constructed asynchronously
    /// on the new worker thread. This never fails from the caller's point
    /// of view: a rejected description surfaces as a logged diagnostic and
    /// a session that never reaches `Playing`, and still must be finalized.
    pub fn init(&self, owner: OwnerRef, description: &str) -> SessionToken {
        let token = SessionToken::new();
        let slot = Arc::new(SurfaceSlot::new());
        let worker = WorkerHandle::spawn(
            self.engine.clone(),
            description.to_owned(),
            slot.clone(),
            self.contexts.clone(),
        );
        let record = SessionRecord {
            owner,
            description: description.to_owned(),
            slot,
            worker,
        };
        let Ok(mut sessions) = self.sessions.lock() else {
            error!(%token, "session table mutex poisoned, shutting the new worker down");
            record.worker.shutdown();
            return token;
        };
        sessions.insert(token, record);
        info!(%token, description, "session created");
        token
    }

    /// Deposits a rendering surface and requests playback.
    ///
    /// The surface replaces (and thereby releases) any previously deposited
    /// one. The `Playing` request is delivered over the session's control
    /// channel: sent before construction finished it is applied right after,
    /// and sent to a worker whose construction failed it is dropped. The
    /// pipeline picks the surface up through its window-handle request.
    ///
    /// An unknown or finalized `token` releases `surface` immediately.
    pub fn bind_surface(&self, token: SessionToken, surface: SurfaceHandle) {
        let Ok(sessions) = self.sessions.lock() else {
            error!(%token, "session table mutex poisoned, releasing surface");
            return;
        };
        let Some(record) = sessions.get(&token) else {
            warn!(%token, "bind_surface on unknown session, releasing surface");
            return;
        };
        debug!(%token, surface = ?surface.raw(), "surface bound");
        record.slot.deposit(surface);
        record.worker.request(PipelineCtrl::Play);
    }

    /// Stops playback and releases the pending surface.
    ///
    /// An unknown or finalized `token` is a logged no-op.
    pub fn unbind_surface(&self, token: SessionToken) {
        let Ok(sessions) = self.sessions.lock() else {
            error!(%token, "session table mutex poisoned, unbind ignored");
            return;
        };
        let Some(record) = sessions.get(&token) else {
            warn!(%token, "unbind_surface on unknown session");
            return;
        };
        debug!(%token, "surface unbound");
        // Stop is queued before the slot clears so a rebind that follows
        // immediately observes Stop then Play in channel order.
        record.worker.request(PipelineCtrl::Stop);
        record.slot.release();
    }

    /// Tears the session down.
    ///
    /// Removes the session from the table first, so a double finalize and
    /// any operation racing with this one observe an absent token, then
    /// signals the worker and blocks until it has exited. Pipeline
    /// resources are therefore released before the owner reference is
    /// dropped. This is the only call that blocks.
    pub fn finalize(&self, token: SessionToken) {
        let record = {
            let Ok(mut sessions) = self.sessions.lock() else {
                error!(%token, "session table mutex poisoned, session leaked");
                return;
            };
            sessions.remove(&token)
        };
        let Some(record) = record else {
            warn!(%token, "finalize on unknown or already finalized session");
            return;
        };
        debug!(%token, description = %record.description, "joining pipeline worker");
        record.worker.shutdown();
        // Engine callbacks may target the owner until the join returns;
        // release it only afterwards.
        drop(record.owner);
        info!(%token, "session finalized");
    }

    /// Returns whether `token` refers to a live session.
    pub fn has_session(&self, token: SessionToken) -> bool {
        self.sessions
            .lock()
            .is_ok_and(|sessions| sessions.contains_key(&token))
    }
}

impl<E: MediaEngine> Drop for SessionController<E> {
    /// Finalizes every remaining session so no worker thread outlives the
    /// controller.
    fn drop(&mut self) {
        let records: Vec<_> = {
            let Ok(mut sessions) = self.sessions.lock() else {
                error!("session table mutex poisoned, leaking remaining workers");
                return;
            };
            sessions.drain().collect()
        };
        for (token, record) in records {
            warn!(%token, "session still live at controller drop, finalizing");
            record.worker.shutdown();
        }
    }
}
