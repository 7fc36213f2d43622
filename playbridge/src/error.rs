// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for session and pipeline operations.
//!
//! Failures stay local to the session, or the single operation, that hit
//! them; nothing here aborts other sessions or the process. Each variant
//! documents the recovery behavior tied to it.

use crate::engine::PipelineState;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when driving a playback session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The engine rejected the pipeline description.
    ///
    /// Fatal to the session's worker: the control loop is never entered and
    /// the session can only be finalized.
    #[error("Pipeline construction failed: {0}")]
    Construct(String),

    /// The engine rejected a state transition.
    ///
    /// The pipeline stays in its previous state; the request is not retried.
    #[error("State transition to {target:?} rejected: {reason}")]
    StateTransition {
        /// The state that was requested.
        target: PipelineState,
        /// Engine-side diagnostic.
        reason: String,
    },

    /// The render sink rejected the window handle.
    ///
    /// The surface is put back as pending so a later window-handle request
    /// can pick it up again.
    #[error("Window handle attach rejected: {0}")]
    Attach(String),

    /// Attaching the current thread to the host runtime failed.
    ///
    /// Fatal to the current operation only. The failure is not cached; the
    /// next call on the same thread attaches again.
    #[error("Host thread attach failed: {0}")]
    HostAttach(String),
}
