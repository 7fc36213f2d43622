// SPDX-FileCopyrightText: 2026 Contributors to the PlayBridge project.
// SPDX-License-Identifier: Apache-2.0

//! Scriptable engine and host fakes shared by the integration tests.
//!
//! [`FakeEngine`] records every call it receives as an [`EngineAction`] on
//! a channel and can be scripted to fail construction, reject state
//! transitions or reject window-handle attaches. A `Playing` transition
//! dispatches [`EngineEvent::WindowHandleRequest`] synchronously from
//! inside `set_state`, holding the handler slot's lock across the dispatch;
//! a test that observes `StateRequested(PipelineState::Playing)` and then
//! calls [`FakeEngine::dispatch`] is therefore serialized after the
//! complete hand-off, including any restore of a rejected surface.
//!
//! The fake keeps one handler slot per engine, so the most recently
//! constructed pipeline owns the event channel. Tests that exercise the
//! hand-off keep at most one surface-active session per engine.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use playbridge::{
    ContextCache, EngineEvent, EnginePipeline, Error, EventDisposition, HostContext, HostRuntime,
    MediaEngine, PipelineState, RawWindowHandle, RenderSink, SessionController, SurfaceHandle,
    SyncHandler,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

static LOG_ONCE: Once = Once::new();

pub fn init_logging() {
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();
    });
}

/// One observable call on the fake engine, in the order it happened.
#[derive(Debug, PartialEq, Eq)]
pub enum EngineAction {
    Constructed(String),
    StateRequested(PipelineState),
    HandleAttached(usize),
    AttachRejected(usize),
}

struct EngineInner {
    actions: Sender<EngineAction>,
    fail_construct: Mutex<Option<String>>,
    construct_gate: Mutex<Option<Receiver<()>>>,
    reject_state: AtomicBool,
    reject_attach: AtomicBool,
    handler: Mutex<Option<SyncHandler>>,
}

#[derive(Clone)]
pub struct FakeEngine {
    inner: Arc<EngineInner>,
}

impl FakeEngine {
    pub fn new() -> (Self, Receiver<EngineAction>) {
        let (actions, observed) = unbounded();
        let engine = Self {
            inner: Arc::new(EngineInner {
                actions,
                fail_construct: Mutex::new(None),
                construct_gate: Mutex::new(None),
                reject_state: AtomicBool::new(false),
                reject_attach: AtomicBool::new(false),
                handler: Mutex::new(None),
            }),
        };
        (engine, observed)
    }

    /// Makes the next `construct` call fail with `message`.
    pub fn fail_next_construct(&self, message: &str) {
        *self.inner.fail_construct.lock().unwrap() = Some(message.to_owned());
    }

    /// Blocks the next `construct` call until the returned sender fires.
    pub fn gate_construction(&self) -> Sender<()> {
        let (release, gate) = bounded(1);
        *self.inner.construct_gate.lock().unwrap() = Some(gate);
        release
    }

    pub fn set_reject_state(&self, reject: bool) {
        self.inner.reject_state.store(reject, Ordering::SeqCst);
    }

    pub fn set_reject_attach(&self, reject: bool) {
        self.inner.reject_attach.store(reject, Ordering::SeqCst);
    }

    /// Dispatches `event` to the installed handler, as the engine would.
    pub fn dispatch(&self, event: EngineEvent) -> Option<EventDisposition> {
        let handler = self.inner.handler.lock().unwrap();
        handler.as_ref().map(|handler| handler(&event))
    }
}

impl MediaEngine for FakeEngine {
    type Pipeline = FakePipeline;

    fn construct(&self, description: &str) -> playbridge::Result<FakePipeline> {
        let gate = self.inner.construct_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        if let Some(message) = self.inner.fail_construct.lock().unwrap().take() {
            return Err(Error::Construct(message));
        }
        let _ = self
            .inner
            .actions
            .send(EngineAction::Constructed(description.to_owned()));
        Ok(FakePipeline {
            inner: self.inner.clone(),
        })
    }
}

pub struct FakePipeline {
    inner: Arc<EngineInner>,
}

impl EnginePipeline for FakePipeline {
    type Sink = FakeSink;

    fn set_state(&self, target: PipelineState) -> playbridge::Result<()> {
        if self.inner.reject_state.load(Ordering::SeqCst) {
            let _ = self
                .inner
                .actions
                .send(EngineAction::StateRequested(target));
            return Err(Error::StateTransition {
                target,
                reason: "rejected by script".to_owned(),
            });
        }
        if target == PipelineState::Playing {
            // Lock first, record second: whoever sees this action and then
            // locks the handler slot runs after the dispatch below.
            let handler = self.inner.handler.lock().unwrap();
            let _ = self
                .inner
                .actions
                .send(EngineAction::StateRequested(target));
            if let Some(handler) = handler.as_ref() {
                handler(&EngineEvent::WindowHandleRequest);
            }
            return Ok(());
        }
        let _ = self
            .inner
            .actions
            .send(EngineAction::StateRequested(target));
        Ok(())
    }

    fn render_sink(&self) -> FakeSink {
        FakeSink {
            inner: self.inner.clone(),
        }
    }

    fn set_sync_handler(&self, handler: SyncHandler) {
        *self.inner.handler.lock().unwrap() = Some(handler);
    }
}

#[derive(Clone)]
pub struct FakeSink {
    inner: Arc<EngineInner>,
}

impl RenderSink for FakeSink {
    fn set_window_handle(&self, handle: RawWindowHandle) -> playbridge::Result<()> {
        if self.inner.reject_attach.load(Ordering::SeqCst) {
            let _ = self
                .inner
                .actions
                .send(EngineAction::AttachRejected(handle.raw()));
            return Err(Error::Attach("rejected by script".to_owned()));
        }
        let _ = self
            .inner
            .actions
            .send(EngineAction::HandleAttached(handle.raw()));
        Ok(())
    }
}

/// Counting host runtime whose contexts record their own drop.
pub struct FakeHost {
    pub attaches: AtomicUsize,
    pub detaches: Arc<AtomicUsize>,
    fail_attaches: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attaches: AtomicUsize::new(0),
            detaches: Arc::new(AtomicUsize::new(0)),
            fail_attaches: AtomicUsize::new(0),
        })
    }

    /// Makes the next `count` attach calls fail.
    pub fn fail_next_attaches(&self, count: usize) {
        self.fail_attaches.store(count, Ordering::SeqCst);
    }
}

impl HostRuntime for FakeHost {
    fn attach_current_thread(&self) -> playbridge::Result<Box<dyn HostContext>> {
        if self
            .fail_attaches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::HostAttach("rejected by script".to_owned()));
        }
        self.attaches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeHostContext {
            detaches: self.detaches.clone(),
        }))
    }
}

struct FakeHostContext {
    detaches: Arc<AtomicUsize>,
}

impl HostContext for FakeHostContext {}

impl Drop for FakeHostContext {
    fn drop(&mut self) {
        self.detaches.fetch_add(1, Ordering::SeqCst);
    }
}

/// Surface whose release hook counts how often it ran.
pub fn tracked_surface(raw: usize) -> (SurfaceHandle, Arc<AtomicUsize>) {
    let releases = Arc::new(AtomicUsize::new(0));
    let counter = releases.clone();
    let surface = SurfaceHandle::with_release(RawWindowHandle::new(raw), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (surface, releases)
}

/// Receives the next recorded action, failing the test after five seconds.
pub fn next_action(observed: &Receiver<EngineAction>) -> EngineAction {
    observed
        .recv_timeout(Duration::from_secs(5))
        .expect("timed out waiting for an engine action")
}

/// Controller over a fresh fake engine and fake host.
pub fn setup() -> (
    SessionController<FakeEngine>,
    FakeEngine,
    Receiver<EngineAction>,
    Arc<FakeHost>,
) {
    init_logging();
    let (engine, observed) = FakeEngine::new();
    let host = FakeHost::new();
    let contexts = ContextCache::new(host.clone());
    let controller = SessionController::new(Arc::new(engine.clone()), contexts);
    (controller, engine, observed, host)
}
