//! Recording doubles shared by the registry test suites.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{Dispose, DisposeError, FaultReporter, RegistryError};

/// Ordered record of disposal calls, shared between services.
#[derive(Debug, Clone, Default)]
pub struct DisposalLog {
    entries: Arc<Mutex<Vec<&'static str>>>,
}

impl DisposalLog {
    fn record(&self, name: &'static str) {
        self.entries
            .lock()
            .expect("disposal log mutex poisoned")
            .push(name);
    }

    /// Names of the disposed services in call order.
    pub fn entries(&self) -> Vec<&'static str> {
        self.entries
            .lock()
            .expect("disposal log mutex poisoned")
            .clone()
    }

    /// Number of times `name` was disposed.
    pub fn count(&self, name: &str) -> usize {
        self.entries().iter().filter(|entry| **entry == name).count()
    }
}

/// How a [`Resource`] behaves when disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// Disposal succeeds.
    Clean,
    /// Disposal returns an error.
    Fails,
    /// Disposal panics.
    Panics,
}

/// Marker naming a distinct resource type.
pub trait ResourceName: Send + Sync + 'static {
    /// Name recorded in the disposal log.
    const NAME: &'static str;
}

macro_rules! resource_names {
    ($($marker:ident => $name:literal),* $(,)?) => {
        $(
            #[derive(Debug)]
            pub struct $marker;

            impl ResourceName for $marker {
                const NAME: &'static str = $name;
            }
        )*
    };
}

resource_names! {
    SyntaxCache => "syntax_cache",
    SessionStore => "session_store",
    IndexWriter => "index_writer",
    FileWatcher => "file_watcher",
}

/// Disposable service that records its teardown.
#[derive(Debug)]
pub struct Resource<N> {
    log: DisposalLog,
    teardown: Teardown,
    _name: PhantomData<fn() -> N>,
}

impl<N: ResourceName> Resource<N> {
    /// Creates a resource that disposes cleanly.
    pub fn new(log: &DisposalLog) -> Self {
        Self::with_teardown(log, Teardown::Clean)
    }

    /// Creates a resource with the given teardown behaviour.
    pub fn with_teardown(log: &DisposalLog, teardown: Teardown) -> Self {
        Self {
            log: log.clone(),
            teardown,
            _name: PhantomData,
        }
    }
}

impl<N: ResourceName> Dispose for Resource<N> {
    fn dispose(&self) -> Result<(), DisposeError> {
        self.log.record(N::NAME);
        match self.teardown {
            Teardown::Clean => Ok(()),
            Teardown::Fails => Err(DisposeError::new(format!("{} refused to close", N::NAME))),
            Teardown::Panics => panic!("{} panicked while closing", N::NAME),
        }
    }
}

/// Counts factory invocations.
#[derive(Debug, Clone, Default)]
pub struct FactoryCounter {
    calls: Arc<AtomicUsize>,
}

impl FactoryCounter {
    /// Records one invocation.
    pub fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of recorded invocations.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Fault reporter that keeps every reported fault.
#[derive(Debug)]
pub struct RecordingFaultReporter {
    faults: Mutex<Vec<String>>,
    handles: AtomicBool,
}

impl Default for RecordingFaultReporter {
    fn default() -> Self {
        Self {
            faults: Mutex::new(Vec::new()),
            handles: AtomicBool::new(true),
        }
    }
}

impl RecordingFaultReporter {
    /// Makes the reporter decline every fault.
    pub fn decline_faults(&self) {
        self.handles.store(false, Ordering::SeqCst);
    }

    /// Rendered faults in report order.
    pub fn faults(&self) -> Vec<String> {
        self.faults
            .lock()
            .expect("fault reporter mutex poisoned")
            .clone()
    }
}

impl FaultReporter for RecordingFaultReporter {
    fn report(&self, error: &RegistryError) -> bool {
        self.faults
            .lock()
            .expect("fault reporter mutex poisoned")
            .push(error.to_string());
        self.handles.load(Ordering::SeqCst)
    }
}
