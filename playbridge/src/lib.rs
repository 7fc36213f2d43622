// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! # PlayBridge
//!
//! Session bridge between a UI-owned rendering surface and an external
//! media engine.
//!
//! ## Overview
//!
//! The crate targets embedders that drive a media engine from a managed UI
//! layer: the UI creates a playback session, later grants and revokes a
//! rendering surface, and eventually tears the session down. In between,
//! the pipeline lives on a dedicated worker thread and picks the surface up
//! through the engine's synchronous event channel the moment it actually
//! needs one, so binding a surface before, during or after pipeline
//! construction all behave the same.
//!
//! ## Key Concepts
//!
//! - **Session**: one UI-side owner, one engine pipeline and one worker
//!   thread, addressed by an opaque [`SessionToken`]. Operations on a stale
//!   token are logged no-ops.
//! - **Surface slot**: the exchange cell through which the UI hands a
//!   [`SurfaceHandle`] to the pipeline. A new deposit replaces (and thereby
//!   releases) the previous surface; a hand-off the sink rejects puts the
//!   surface back for the next attempt.
//! - **Engine boundary**: the embedder implements [`MediaEngine`],
//!   [`EnginePipeline`] and [`RenderSink`] over the actual media stack.
//! - **Host runtime**: threads created by the engine attach to the
//!   embedder's [`HostRuntime`] (for example a Java VM) through a
//!   [`ContextCache`], once per thread, detaching automatically at thread
//!   exit.
//!
//! ## Architecture
//!
//! ```text
//!  UI side (any thread)                worker thread "playbridge-pipeline"
//! +---------------------+   control   +--------------------------------+
//! | SessionController   |   channel   | construct pipeline             |
//! |   init   bind       |------------>| install event interceptor      |
//! |   unbind finalize   |             | apply Play / Stop requests     |
//! +----------+----------+             +---------------+----------------+
//!            |                                        |
//!            | deposit /                  synchronous | WindowHandleRequest
//!            | release                    dispatch    v
//!       +-------------+   take_if_present   +-----------------+
//!       | SurfaceSlot |<--------------------|   interceptor   |
//!       +-------------+                     +--------+--------+
//!                                                    |
//!                                                    v
//!                                       RenderSink::set_window_handle
//! ```
//!
//! ## Examples
//!
//! ```
//! # use playbridge::{
//! #     EnginePipeline, HostContext, HostRuntime, MediaEngine, PipelineState, RenderSink,
//! #     SyncHandler,
//! # };
//! # struct Host;
//! # struct HostThread;
//! # impl HostContext for HostThread {}
//! # impl HostRuntime for Host {
//! #     fn attach_current_thread(&self) -> playbridge::Result<Box<dyn HostContext>> {
//! #         Ok(Box::new(HostThread))
//! #     }
//! # }
//! # struct Engine;
//! # struct Pipeline;
//! # struct Sink;
//! # impl MediaEngine for Engine {
//! #     type Pipeline = Pipeline;
//! #     fn construct(&self, _description: &str) -> playbridge::Result<Pipeline> {
//! #         Ok(Pipeline)
//! #     }
//! # }
//! # impl EnginePipeline for Pipeline {
//! #     type Sink = Sink;
//! #     fn set_state(&self, _target: PipelineState) -> playbridge::Result<()> {
//! #         Ok(())
//! #     }
//! #     fn render_sink(&self) -> Sink {
//! #         Sink
//! #     }
//! #     fn set_sync_handler(&self, _handler: SyncHandler) {}
//! # }
//! # impl RenderSink for Sink {
//! #     fn set_window_handle(&self, _handle: playbridge::RawWindowHandle) -> playbridge::Result<()> {
//! #         Ok(())
//! #     }
//! # }
//! use std::sync::Arc;
//!
//! use playbridge::{ContextCache, OwnerRef, RawWindowHandle, SessionController, SurfaceHandle};
//!
//! // `Engine` and `Host` implement the engine and host-runtime traits.
//! let contexts = ContextCache::new(Arc::new(Host));
//! let controller = SessionController::new(Arc::new(Engine), contexts);
//!
//! let token = controller.init(OwnerRef::new(()), "videotestsrc ! autovideosink");
//! controller.bind_surface(token, SurfaceHandle::new(RawWindowHandle::new(0x7f00_1000)));
//!
//! // Playback runs until the UI revokes the surface.
//!
//! controller.unbind_surface(token);
//! controller.finalize(token);
//! ```
//!
//! ## Thread Safety
//!
//! - [`SessionController`] is `Send + Sync`; all methods take `&self` and
//!   may be called from any thread.
//! - Each pipeline is owned by its session's worker thread. UI calls never
//!   touch the pipeline directly; they are delegated over the session's
//!   control channel.
//! - [`SessionController::finalize`] blocks until the worker has exited.
//!   Every other operation returns without waiting for the pipeline.
//! - The synchronous event interceptor runs on whatever thread the engine
//!   dispatches from; [`ContextCache`] attaches such threads to the host
//!   runtime on first use.

mod engine;
mod error;
mod host;
mod pipeline;
mod session;
mod surface;
mod worker;

pub use engine::{
    EngineEvent, EnginePipeline, EventDisposition, MediaEngine, PipelineState, RenderSink,
    SyncHandler,
};
pub use error::{Error, Result};
pub use host::{ContextCache, HostContext, HostRuntime};
pub use session::{OwnerRef, SessionController, SessionToken};
pub use surface::{RawWindowHandle, SurfaceHandle};
