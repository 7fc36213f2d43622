// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! The media-engine boundary.
//!
//! The session controller never constructs or decodes media itself; it
//! drives an external engine through the traits in this module. An embedder
//! implements [`MediaEngine`] (pipeline construction from a textual
//! description), [`EnginePipeline`] (coarse state control plus the
//! synchronous event channel) and [`RenderSink`] (the capability that
//! accepts a window handle).
//!
//! The crate makes no assumption about which thread the engine dispatches
//! events on. A handler installed via [`EnginePipeline::set_sync_handler`]
//! must be callable from any context, and the engine must invoke it
//! synchronously so the handler's [`EventDisposition`] can decide whether
//! the event propagates further.

use crate::Result;
use crate::surface::RawWindowHandle;

/// Coarse pipeline execution states used by the session controller.
///
/// The controller only ever requests these two states; finer engine states
/// (paused, buffering, ...) stay engine-internal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// All pipeline resources are released and no data flows.
    Stopped,
    /// The pipeline processes and renders data.
    Playing,
}

/// Lifecycle notification dispatched synchronously by the engine.
#[derive(Debug)]
pub enum EngineEvent {
    /// The pipeline needs a window handle before it can render video.
    WindowHandleRequest,
    /// The pipeline moved to a new execution state.
    StateChanged(PipelineState),
    /// Playback reached the end of the stream.
    EndOfStream,
    /// The engine reported a runtime error.
    Error(String),
}

/// Verdict returned by a synchronous event handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event was not handled here and propagates to other listeners.
    Pass,
    /// The event was consumed and must not propagate further.
    Drop,
}

/// Synchronous event interceptor installed on a pipeline.
///
/// Invoked in whatever context the engine dispatches events from, so it
/// must be callable from any thread and must return quickly.
pub type SyncHandler = Box<dyn Fn(&EngineEvent) -> EventDisposition + Send + Sync>;

/// Factory for engine pipelines.
///
/// One engine is injected per [`crate::SessionController`] and shared by all
/// of its sessions.
pub trait MediaEngine: Send + Sync + 'static {
    /// Pipeline type produced by [`construct`](Self::construct).
    type Pipeline: EnginePipeline;

    /// Builds a pipeline from a textual description.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Construct`] if the description is malformed
    /// or names capabilities the engine does not provide.
    fn construct(&self, description: &str) -> Result<Self::Pipeline>;
}

/// A constructed pipeline, owned by its session's worker thread.
///
/// Dropping the pipeline releases all engine-side resources.
pub trait EnginePipeline: Send + 'static {
    /// Render-sink capability handed out by [`render_sink`](Self::render_sink).
    type Sink: RenderSink;

    /// Requests a state transition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StateTransition`] if the engine rejects the
    /// transition. The pipeline stays in its previous state.
    fn set_state(&self, target: PipelineState) -> Result<()>;

    /// Returns the sink capability that accepts a window handle.
    ///
    /// The returned value must be safe to use from any thread, before and
    /// during playback.
    fn render_sink(&self) -> Self::Sink;

    /// Installs `handler` on the pipeline's synchronous event channel,
    /// replacing any previous handler.
    fn set_sync_handler(&self, handler: SyncHandler);
}

/// Capability that routes the pipeline's video output into a window.
pub trait RenderSink: Send + Sync + 'static {
    /// Attaches a window-system handle to the pipeline's video output.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Attach`] if the sink cannot use the handle.
    fn set_window_handle(&self, handle: RawWindowHandle) -> Result<()>;
}
