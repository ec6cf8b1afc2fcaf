//! Stub collaborators shared by the unit tests of this crate.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use herald_core::{
    BeanFactory, BoxError, BoxedComponent, BoxedFactory, Component, ContextResolver,
    LifecycleEvent, LifecycleListener, ListenerError, PluginInterface, ResolveError,
    ResolveResult,
};

pub(crate) struct StubComponent {
    id: String,
}

impl StubComponent {
    pub(crate) fn boxed(id: &str) -> BoxedComponent {
        Arc::new(Self { id: id.to_string() })
    }
}

impl Component for StubComponent {
    fn id(&self) -> &str {
        &self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PluginInterface for StubComponent {}

/// Factory exposing a fixed `ID` property equal to the component id.
pub(crate) struct StubFactory;

impl BeanFactory for StubFactory {
    fn bean_property(&self, instance: &dyn Component, name: &str) -> Result<Option<Value>, BoxError> {
        match name {
            "ID" => Ok(Some(Value::String(instance.id().to_string()))),
            "BROKEN" => Err("property store unavailable".into()),
            _ => Ok(None),
        }
    }
}

/// What the stub resolver answers once its script is exhausted.
#[derive(Clone, Copy)]
pub(crate) enum Answer {
    Factory,
    Pending,
    TrackerError,
    OtherError,
}

impl Answer {
    fn produce(self) -> ResolveResult<Option<BoxedFactory>> {
        match self {
            Self::Factory => Ok(Some(Arc::new(StubFactory))),
            Self::Pending => Ok(None),
            Self::TrackerError => Err(ResolveError::tracker("tracker is shutting down")),
            Self::OtherError => Err(ResolveError::other("bean creation failed")),
        }
    }
}

/// Resolver that plays a script of answers, then repeats a fallback.
pub(crate) struct StubResolver {
    script: Mutex<VecDeque<Answer>>,
    fallback: Mutex<Answer>,
    unwrapper: AtomicBool,
    calls: AtomicUsize,
}

impl StubResolver {
    pub(crate) fn new(fallback: Answer) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            unwrapper: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn scripted(script: &[Answer], fallback: Answer) -> Arc<Self> {
        let resolver = Self::new(fallback);
        resolver.script.lock().extend(script.iter().copied());
        resolver
    }

    pub(crate) fn set_fallback(&self, answer: Answer) {
        *self.fallback.lock() = answer;
    }

    pub(crate) fn set_unwrapper(&self, available: bool) {
        self.unwrapper.store(available, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextResolver for StubResolver {
    async fn resolve(&self, _instance: &BoxedComponent) -> ResolveResult<Option<BoxedFactory>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| *self.fallback.lock());
        answer.produce()
    }

    fn unwrapper_available(&self) -> bool {
        self.unwrapper.load(Ordering::SeqCst)
    }
}

/// Listener recording every call, optionally failing the first few.
pub(crate) struct RecordingListener {
    calls: Mutex<Vec<(LifecycleEvent, String)>>,
    invalid_context_failures: AtomicUsize,
    fail_with: Mutex<Option<String>>,
}

impl RecordingListener {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            invalid_context_failures: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
        })
    }

    /// Fails the next `n` calls with an invalid-context error.
    pub(crate) fn failing_invalid_context(n: usize) -> Arc<Self> {
        let listener = Self::new();
        listener.invalid_context_failures.store(n, Ordering::SeqCst);
        listener
    }

    /// Fails every call with a plain error.
    pub(crate) fn failing(msg: &str) -> Arc<Self> {
        let listener = Self::new();
        *listener.fail_with.lock() = Some(msg.to_string());
        listener
    }

    /// Fails the next `n` calls with an invalid-context error, then every
    /// later call with a plain error.
    pub(crate) fn failing_after_invalid_context(n: usize, msg: &str) -> Arc<Self> {
        let listener = Self::failing(msg);
        listener.invalid_context_failures.store(n, Ordering::SeqCst);
        listener
    }

    pub(crate) fn calls(&self) -> Vec<(LifecycleEvent, String)> {
        self.calls.lock().clone()
    }

    fn record(&self, kind: LifecycleEvent, instance: &BoxedComponent) -> Result<(), ListenerError> {
        self.calls.lock().push((kind, instance.id().to_string()));
        let pending = self.invalid_context_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.invalid_context_failures
                .store(pending - 1, Ordering::SeqCst);
            return Err(ListenerError::invalid_context("container is restarting"));
        }
        match self.fail_with.lock().as_ref() {
            Some(msg) => Err(ListenerError::failed(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LifecycleListener for RecordingListener {
    async fn added(&self, instance: &BoxedComponent) -> Result<(), ListenerError> {
        self.record(LifecycleEvent::Added, instance)
    }

    async fn removed(&self, instance: &BoxedComponent) -> Result<(), ListenerError> {
        self.record(LifecycleEvent::Removed, instance)
    }

    async fn modified(&self, instance: &BoxedComponent) -> Result<(), ListenerError> {
        self.record(LifecycleEvent::Modified, instance)
    }
}
