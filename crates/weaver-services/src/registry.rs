//! Type-keyed service table with lazy singletons and tracked teardown.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;
use weaver_config::ServerKind;

use crate::container::ServiceContainer;
use crate::descriptor::{Materialised, ServiceDescriptor, ServiceInstance, ServiceType};
use crate::dispose::Dispose;
use crate::error::RegistryError;
use crate::reporter::FaultReporter;

const REGISTRY_TARGET: &str = "weaver_services::registry";

/// Singleton produced by a factory, or the message of the panic that aborted
/// it.
type Construction = Result<ServiceInstance, String>;

/// A registered descriptor and the outcome of its first request.
pub(crate) struct ServiceEntry {
    descriptor: ServiceDescriptor,
    instance: OnceCell<Construction>,
}

impl ServiceEntry {
    pub(crate) const fn new(descriptor: ServiceDescriptor) -> Self {
        Self {
            descriptor,
            instance: OnceCell::new(),
        }
    }
}

struct TrackedService {
    service: ServiceType,
    disposer: Arc<dyn Dispose>,
}

/// Outcome of [`ServiceRegistry::shutdown`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Services whose disposal completed.
    pub disposed: usize,
    /// Services whose disposal returned an error or panicked.
    pub failed: usize,
    /// Failures the fault reporter declined to handle.
    pub unhandled: usize,
}

impl ShutdownReport {
    /// Number of services disposal was attempted on.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.disposed + self.failed
    }

    /// Returns `true` when every disposal succeeded.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Resolves capability types to lazily constructed, shared instances.
///
/// Built with [`crate::ServiceRegistryBuilder`]. The set of registered types is
/// fixed at construction. Each type's factory runs at most once, even under
/// concurrent first requests, and every caller receives the same `Arc`. A
/// factory that panics is not retried: the panic is recorded and every
/// request for the type panics with [`RegistryError::ConstructionFailed`].
///
/// Instances of disposable, stateful services are recorded when first
/// resolved and disposed by [`ServiceRegistry::shutdown`]. Dropping a registry
/// with recorded instances still pending shuts it down.
pub struct ServiceRegistry {
    server_kind: ServerKind,
    entries: HashMap<TypeId, ServiceEntry>,
    container: Option<Arc<dyn ServiceContainer>>,
    reporter: Arc<dyn FaultReporter>,
    disposables: Mutex<Vec<TrackedService>>,
    shut_down: AtomicBool,
}

impl ServiceRegistry {
    pub(crate) fn new(
        server_kind: ServerKind,
        entries: HashMap<TypeId, ServiceEntry>,
        container: Option<Arc<dyn ServiceContainer>>,
        reporter: Arc<dyn FaultReporter>,
    ) -> Self {
        Self {
            server_kind,
            entries,
            container,
            reporter,
            disposables: Mutex::new(Vec::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Server kind the registry was built for.
    #[must_use]
    pub const fn server_kind(&self) -> ServerKind {
        self.server_kind
    }

    /// Returns the shared instance of `T`, constructing it on first request.
    ///
    /// Returns `None` when no descriptor for `T` survived registration. The
    /// secondary container is not consulted.
    ///
    /// # Panics
    ///
    /// Panics with [`RegistryError::ConstructionFailed`] when the factory for
    /// `T` panicked, whether on this request or an earlier one.
    #[must_use]
    #[track_caller]
    pub fn try_get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let entry = self.entries.get(&TypeId::of::<T>())?;
        let constructed = entry
            .instance
            .get_or_init(|| self.construct(&entry.descriptor));
        match constructed {
            Ok(instance) => Arc::clone(instance).downcast::<T>().ok(),
            Err(message) => panic!(
                "{}",
                RegistryError::ConstructionFailed {
                    service: entry.descriptor.service(),
                    message: message.clone(),
                }
            ),
        }
    }

    /// Returns the instance of `T` from the secondary container or, failing
    /// that, from the registry's own factories.
    ///
    /// # Panics
    ///
    /// Panics with a "missing required service" message when neither source
    /// provides `T`. A missing required service is a wiring defect in the
    /// host, not a recoverable condition. Also panics as
    /// [`try_get`](Self::try_get) does when the factory for `T` panicked.
    #[must_use]
    #[track_caller]
    pub fn get_required<T: Any + Send + Sync>(&self) -> Arc<T> {
        let service = ServiceType::of::<T>();
        if let Some(container) = &self.container
            && let Some(instance) = container.resolve(service)
            && let Ok(typed) = instance.downcast::<T>()
        {
            return typed;
        }
        match self.try_get::<T>() {
            Some(instance) => instance,
            None => panic!("{}", RegistryError::MissingService { service }),
        }
    }

    /// Types with a descriptor in this registry, sorted by type name.
    #[must_use]
    pub fn registered_types(&self) -> Vec<ServiceType> {
        let mut types: Vec<_> = self
            .entries
            .values()
            .map(|entry| entry.descriptor.service())
            .collect();
        types.sort_unstable();
        types
    }

    /// Returns `true` when the registry holds a descriptor for `T`.
    #[must_use]
    pub fn is_registered<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` once the singleton for `T` has been constructed.
    #[must_use]
    pub fn is_resolved<T: Any>(&self) -> bool {
        self.entries
            .get(&TypeId::of::<T>())
            .is_some_and(|entry| matches!(entry.instance.get(), Some(Ok(_))))
    }

    /// Number of instances awaiting disposal.
    #[must_use]
    pub fn pending_disposals(&self) -> usize {
        self.lock_disposables().len()
    }

    /// Disposes every recorded instance exactly once.
    ///
    /// The pending set is taken and cleared under its lock; disposal runs
    /// after the lock is released, most recently resolved first, so a
    /// service's dependencies outlive it. Errors and panics raised by a
    /// disposal are passed to the [`FaultReporter`] and the remaining
    /// services are still disposed. Calling `shutdown` again only disposes
    /// instances resolved since the previous call.
    pub fn shutdown(&self) -> ShutdownReport {
        self.shut_down.store(true, Ordering::Release);
        let pending = mem::take(&mut *self.lock_disposables());

        let mut report = ShutdownReport::default();
        for TrackedService { service, disposer } in pending.into_iter().rev() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| disposer.dispose()));
            let fault = match outcome {
                Ok(Ok(())) => {
                    report.disposed += 1;
                    continue;
                }
                Ok(Err(source)) => RegistryError::Disposal { service, source },
                Err(payload) => RegistryError::DisposalPanicked {
                    service,
                    message: panic_message(payload.as_ref()),
                },
            };
            report.failed += 1;
            if !self.reporter.report(&fault) {
                report.unhandled += 1;
            }
        }

        if report.attempted() > 0 {
            tracing::info!(
                target: REGISTRY_TARGET,
                server_kind = %self.server_kind,
                disposed = report.disposed,
                failed = report.failed,
                "service registry shut down"
            );
        }
        report
    }

    fn construct(&self, descriptor: &ServiceDescriptor) -> Construction {
        panic::catch_unwind(AssertUnwindSafe(|| self.materialise(descriptor))).map_err(|payload| {
            let message = panic_message(payload.as_ref());
            tracing::error!(
                target: REGISTRY_TARGET,
                service = %descriptor.service(),
                message = %message,
                "service factory panicked"
            );
            message
        })
    }

    fn materialise(&self, descriptor: &ServiceDescriptor) -> ServiceInstance {
        let service = descriptor.service();
        let Materialised { instance, disposer } = descriptor.materialise(self);
        tracing::debug!(target: REGISTRY_TARGET, service = %service, "service resolved");

        if descriptor.tracks_disposal()
            && let Some(disposer) = disposer
        {
            let mut pending = self.lock_disposables();
            if self.shut_down.load(Ordering::Acquire) {
                tracing::warn!(
                    target: REGISTRY_TARGET,
                    service = %service,
                    "disposable service resolved after shutdown"
                );
            }
            pending.push(TrackedService { service, disposer });
        }
        instance
    }

    fn lock_disposables(&self) -> MutexGuard<'_, Vec<TrackedService>> {
        self.disposables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}

impl Drop for ServiceRegistry {
    fn drop(&mut self) {
        let pending = self
            .disposables
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if !pending.is_empty() {
            self.shutdown();
        }
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServiceRegistry")
            .field("server_kind", &self.server_kind)
            .field("services", &self.registered_types())
            .field("has_container", &self.container.is_some())
            .field("shut_down", &self.shut_down.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
