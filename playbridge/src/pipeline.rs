// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! Worker-side pipeline adapter.
//!
//! [`PipelineRuntime`] wraps the engine pipeline for the lifetime of one
//! worker run: construction, best-effort state requests and the synchronous
//! surface interceptor. State rejections are logged and absorbed here; the
//! session keeps running in its previous observable state.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::Result;
use crate::engine::{
    EngineEvent, EnginePipeline, EventDisposition, MediaEngine, PipelineState, RenderSink,
};
use crate::host::ContextCache;
use crate::surface::SurfaceSlot;

pub(crate) struct PipelineRuntime<E: MediaEngine> {
    pipeline: E::Pipeline,
}

impl<E: MediaEngine> PipelineRuntime<E> {
    /// Builds the pipeline from its textual description.
    pub(crate) fn construct(engine: &E, description: &str) -> Result<Self> {
        let pipeline = engine.construct(description)?;
        debug!(description, "pipeline constructed");
        Ok(Self { pipeline })
    }

    /// Requests a state transition, absorbing rejections.
    pub(crate) fn request_state(&self, target: PipelineState) {
        debug!(?target, "requesting pipeline state");
        if let Err(error) = self.pipeline.set_state(target) {
            warn!(%error, "pipeline kept its previous state");
        }
    }

    /// Installs the interceptor that answers window-handle requests from
    /// the pending surface.
    ///
    /// Runs in the engine's notification context. Every event other than
    /// the window-handle request passes through untouched, as does a
    /// request that finds the slot empty.
    pub(crate) fn install_surface_interceptor(
        &self,
        slot: Arc<SurfaceSlot>,
        contexts: ContextCache,
    ) {
        let sink = self.pipeline.render_sink();
        self.pipeline.set_sync_handler(Box::new(move |event| {
            if !matches!(event, EngineEvent::WindowHandleRequest) {
                return EventDisposition::Pass;
            }
            let Some(surface) = slot.take_if_present() else {
                return EventDisposition::Pass;
            };
            let raw = surface.raw();
            match contexts.with_context(|_context| sink.set_window_handle(raw)) {
                Ok(Ok(())) => {
                    debug!(surface = ?raw, "window handle attached to render sink");
                    // The sink holds the window now; the owning reference
                    // goes back to the UI side.
                    drop(surface);
                    EventDisposition::Drop
                }
                Ok(Err(error)) => {
                    warn!(%error, "render sink rejected the window handle");
                    slot.restore(surface);
                    EventDisposition::Pass
                }
                Err(error) => {
                    error!(%error, "no host context for the window hand-off");
                    slot.restore(surface);
                    EventDisposition::Pass
                }
            }
        }));
    }
}
