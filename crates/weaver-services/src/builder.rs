//! Assembles a [`ServiceRegistry`] from scoped and baseline descriptors.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use weaver_checksum::ChecksumCache;
use weaver_config::{HostConfig, ServerKind, default_checksum_cache_capacity};

use crate::container::ServiceContainer;
use crate::descriptor::ServiceDescriptor;
use crate::registry::{ServiceEntry, ServiceRegistry};
use crate::reporter::{FaultReporter, StructuredFaultReporter};

/// Source of descriptors contributed by a component.
pub trait ServiceProvider {
    /// Descriptors for the services the component offers.
    fn descriptors(&self) -> Vec<ServiceDescriptor>;
}

impl<F> ServiceProvider for F
where
    F: Fn() -> Vec<ServiceDescriptor>,
{
    fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self()
    }
}

/// Collects descriptors and wiring for a [`ServiceRegistry`].
///
/// Scoped descriptors (added through [`with_service`](Self::with_service),
/// [`with_services`](Self::with_services) and
/// [`with_provider`](Self::with_provider)) are kept only when their scope
/// applies to the builder's server kind. Baseline descriptors are always kept
/// and are applied after the scoped ones. When two kept descriptors name the
/// same type, the later one wins.
pub struct ServiceRegistryBuilder {
    server_kind: ServerKind,
    checksum_cache_capacity: NonZeroUsize,
    scoped: Vec<ServiceDescriptor>,
    baseline: Vec<ServiceDescriptor>,
    container: Option<Arc<dyn ServiceContainer>>,
    reporter: Arc<dyn FaultReporter>,
}

impl ServiceRegistryBuilder {
    /// Starts a registry for `server_kind` that reports faults through
    /// [`StructuredFaultReporter`].
    #[must_use]
    pub fn new(server_kind: ServerKind) -> Self {
        Self {
            server_kind,
            checksum_cache_capacity: default_checksum_cache_capacity(),
            scoped: Vec::new(),
            baseline: Vec::new(),
            container: None,
            reporter: Arc::new(StructuredFaultReporter::new()),
        }
    }

    /// Starts a registry for the server kind named in `config`. Checksum
    /// caches added with [`with_checksum_cache`](Self::with_checksum_cache)
    /// take their capacity from the same configuration.
    #[must_use]
    pub fn from_config(config: &HostConfig) -> Self {
        let mut builder = Self::new(config.server_kind());
        builder.checksum_cache_capacity = config.checksum_cache_capacity();
        builder
    }

    /// Adds a scoped descriptor.
    #[must_use]
    pub fn with_service(mut self, descriptor: ServiceDescriptor) -> Self {
        self.scoped.push(descriptor);
        self
    }

    /// Adds several scoped descriptors in order.
    #[must_use]
    pub fn with_services<I>(mut self, descriptors: I) -> Self
    where
        I: IntoIterator<Item = ServiceDescriptor>,
    {
        self.scoped.extend(descriptors);
        self
    }

    /// Adds the descriptors offered by `provider` as scoped descriptors.
    #[must_use]
    pub fn with_provider<P: ServiceProvider + ?Sized>(self, provider: &P) -> Self {
        self.with_services(provider.descriptors())
    }

    /// Adds a baseline descriptor, kept regardless of scope.
    #[must_use]
    pub fn with_baseline(mut self, descriptor: ServiceDescriptor) -> Self {
        self.baseline.push(descriptor);
        self
    }

    /// Adds a baseline [`ChecksumCache`] keyed by `K`, sized by the
    /// configured checksum cache capacity.
    ///
    /// The cache is stateless from the registry's point of view: it is
    /// shared by every consumer and dropped with the registry.
    #[must_use]
    pub fn with_checksum_cache<K>(self) -> Self
    where
        K: Hash + Eq + Send + Sync + 'static,
    {
        let capacity = self.checksum_cache_capacity;
        self.with_baseline(
            ServiceDescriptor::new(move |_| ChecksumCache::<K>::new(capacity)).stateless(),
        )
    }

    /// Installs the secondary container consulted by
    /// [`ServiceRegistry::get_required`].
    #[must_use]
    pub fn with_container(mut self, container: impl ServiceContainer + 'static) -> Self {
        self.container = Some(Arc::new(container));
        self
    }

    /// Replaces the fault reporter used during shutdown.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl FaultReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Builds the registry. No factory runs until its type is requested.
    #[must_use]
    pub fn build(self) -> ServiceRegistry {
        let Self {
            server_kind,
            checksum_cache_capacity: _,
            scoped,
            baseline,
            container,
            reporter,
        } = self;

        let mut entries = HashMap::new();
        let kept = scoped.into_iter().filter(|descriptor| {
            let applies = descriptor.metadata().scope.applies_to(server_kind);
            if !applies {
                tracing::trace!(
                    target: "weaver_services::registry",
                    service = %descriptor.service(),
                    scope = %descriptor.metadata().scope,
                    server_kind = %server_kind,
                    "descriptor out of scope"
                );
            }
            applies
        });

        for descriptor in kept.chain(baseline) {
            let service = descriptor.service();
            if entries
                .insert(service.id(), ServiceEntry::new(descriptor))
                .is_some()
            {
                tracing::debug!(
                    target: "weaver_services::registry",
                    service = %service,
                    "service registration replaced"
                );
            }
        }

        ServiceRegistry::new(server_kind, entries, container, reporter)
    }
}

impl std::fmt::Debug for ServiceRegistryBuilder {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ServiceRegistryBuilder")
            .field("server_kind", &self.server_kind)
            .field("checksum_cache_capacity", &self.checksum_cache_capacity)
            .field("scoped", &self.scoped)
            .field("baseline", &self.baseline)
            .field("has_container", &self.container.is_some())
            .finish_non_exhaustive()
    }
}
