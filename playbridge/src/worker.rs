// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! Per-session worker thread.
//!
//! Each session owns one worker. The worker constructs the pipeline, keeps
//! it alive while blocking on the control channel and tears it down on
//! exit. A failed construction is terminal: the worker exits immediately,
//! the channel receiver is dropped and later control requests become logged
//! no-ops.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, warn};

use crate::engine::{MediaEngine, PipelineState};
use crate::host::ContextCache;
use crate::pipeline::PipelineRuntime;
use crate::surface::SurfaceSlot;

/// Name given to every pipeline worker thread.
const WORKER_THREAD_NAME: &str = "playbridge-pipeline";

/// Control messages delivered to a session's worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PipelineCtrl {
    /// Request the `Playing` state.
    Play,
    /// Request the `Stopped` state.
    Stop,
    /// Leave the control loop and tear the pipeline down.
    Quit,
}

/// Owning handle to a session's worker thread.
pub(crate) struct WorkerHandle {
    ctrl: Sender<PipelineCtrl>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawns the worker for one session.
    pub(crate) fn spawn<E: MediaEngine>(
        engine: Arc<E>,
        description: String,
        slot: Arc<SurfaceSlot>,
        contexts: ContextCache,
    ) -> Self {
        let (ctrl, ctrl_rx) = crossbeam_channel::unbounded();
        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || run(engine, description, slot, contexts, ctrl_rx))
            .expect("failed to spawn pipeline worker thread");
        Self { ctrl, thread }
    }

    /// Sends a control request to the worker.
    ///
    /// A disconnected channel means construction failed and the worker is
    /// gone; the request is dropped.
    pub(crate) fn request(&self, ctrl: PipelineCtrl) {
        if self.ctrl.send(ctrl).is_err() {
            warn!(request = ?ctrl, "pipeline worker is gone, dropping control request");
        }
    }

    /// Stops the control loop and waits for the worker to exit.
    pub(crate) fn shutdown(self) {
        // A closed channel just means the worker already exited on its own.
        let _ = self.ctrl.send(PipelineCtrl::Quit);
        if self.thread.join().is_err() {
            error!("pipeline worker panicked before exiting");
        }
    }
}

/// Worker entry point: construct, serve the control loop, tear down.
fn run<E: MediaEngine>(
    engine: Arc<E>,
    description: String,
    slot: Arc<SurfaceSlot>,
    contexts: ContextCache,
    ctrl: Receiver<PipelineCtrl>,
) {
    let runtime = match PipelineRuntime::construct(engine.as_ref(), &description) {
        Ok(runtime) => runtime,
        Err(error) => {
            error!(%error, description, "pipeline construction failed, worker exiting");
            return;
        }
    };

    // The interceptor must be in place before the first transition so a
    // window-handle request fired by it cannot be missed.
    runtime.install_surface_interceptor(slot.clone(), contexts);

    if slot.has_pending() {
        debug!("surface already bound, starting playback");
        runtime.request_state(PipelineState::Playing);
    }

    loop {
        match ctrl.recv() {
            Ok(PipelineCtrl::Play) => runtime.request_state(PipelineState::Playing),
            Ok(PipelineCtrl::Stop) => runtime.request_state(PipelineState::Stopped),
            // The controller dropping the sender counts as a quit.
            Ok(PipelineCtrl::Quit) | Err(_) => break,
        }
    }

    runtime.request_state(PipelineState::Stopped);
    debug!("pipeline worker exited");
}
