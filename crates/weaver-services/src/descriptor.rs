//! Registration-time description of a service.

use std::any::{self, Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use weaver_config::ServerKind;

use crate::dispose::Dispose;
use crate::registry::ServiceRegistry;

/// Type-erased handle to a materialised service.
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

type Factory = Box<dyn Fn(&ServiceRegistry) -> Materialised + Send + Sync>;

/// Output of a factory: the shared instance plus its disposal hook, if the
/// descriptor declared one.
pub(crate) struct Materialised {
    pub(crate) instance: ServiceInstance,
    pub(crate) disposer: Option<Arc<dyn Dispose>>,
}

/// Identity of a capability type.
///
/// Equality and hashing use the [`TypeId`] only; the type name is carried for
/// diagnostics and ordering.
#[derive(Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    /// Identity of `T`.
    #[must_use]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// Runtime type identifier.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ServiceType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServiceType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("ServiceType")
            .field(&self.name)
            .finish()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name)
    }
}

/// Host configurations a descriptor applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ServiceScope {
    /// Applies to every registry.
    #[default]
    Any,
    /// Applies only to registries built for the given kind.
    Only(ServerKind),
}

impl ServiceScope {
    /// Returns `true` when a registry of `kind` should keep the descriptor.
    #[must_use]
    pub fn applies_to(self, kind: ServerKind) -> bool {
        match self {
            Self::Any => true,
            Self::Only(scoped) => scoped == kind,
        }
    }
}

impl fmt::Display for ServiceScope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => formatter.write_str("any"),
            Self::Only(kind) => write!(formatter, "{kind}"),
        }
    }
}

/// Flags attached to a descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceMetadata {
    /// The instance needs no teardown tracking even if it is disposable.
    pub stateless: bool,
    /// Registries the descriptor applies to.
    pub scope: ServiceScope,
}

/// A capability type paired with the factory that builds it.
pub struct ServiceDescriptor {
    service: ServiceType,
    metadata: ServiceMetadata,
    disposable: bool,
    factory: Factory,
}

impl ServiceDescriptor {
    /// Describes a service without a disposal hook.
    ///
    /// The factory receives the registry so it can resolve the services it
    /// depends on. It runs at most once per registry.
    #[must_use]
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceRegistry) -> T + Send + Sync + 'static,
    {
        Self {
            service: ServiceType::of::<T>(),
            metadata: ServiceMetadata::default(),
            disposable: false,
            factory: Box::new(move |registry: &ServiceRegistry| Materialised {
                instance: Arc::new(factory(registry)),
                disposer: None,
            }),
        }
    }

    /// Describes a service whose instance is disposed at registry shutdown.
    ///
    /// Tracking is skipped when the descriptor is also marked
    /// [`stateless`](Self::stateless).
    #[must_use]
    pub fn disposable<T, F>(factory: F) -> Self
    where
        T: Dispose + Any,
        F: Fn(&ServiceRegistry) -> T + Send + Sync + 'static,
    {
        Self {
            service: ServiceType::of::<T>(),
            metadata: ServiceMetadata::default(),
            disposable: true,
            factory: Box::new(move |registry: &ServiceRegistry| {
                let instance = Arc::new(factory(registry));
                let disposer: Arc<dyn Dispose> = instance.clone();
                Materialised {
                    instance,
                    disposer: Some(disposer),
                }
            }),
        }
    }

    /// Marks the service as stateless: shared freely, never disposed by the
    /// registry.
    #[must_use]
    pub const fn stateless(mut self) -> Self {
        self.metadata.stateless = true;
        self
    }

    /// Restricts the descriptor to registries built for `kind`.
    #[must_use]
    pub const fn scoped_to(self, kind: ServerKind) -> Self {
        self.with_scope(ServiceScope::Only(kind))
    }

    /// Replaces the descriptor's scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: ServiceScope) -> Self {
        self.metadata.scope = scope;
        self
    }

    /// Capability type built by the factory.
    #[must_use]
    pub const fn service(&self) -> ServiceType {
        self.service
    }

    /// Flags attached at registration.
    #[must_use]
    pub const fn metadata(&self) -> ServiceMetadata {
        self.metadata
    }

    /// Whether the instance carries a disposal hook.
    #[must_use]
    pub const fn is_disposable(&self) -> bool {
        self.disposable
    }

    /// Whether the registry must track the instance for shutdown.
    #[must_use]
    pub const fn tracks_disposal(&self) -> bool {
        self.disposable && !self.metadata.stateless
    }

    pub(crate) fn materialise(&self, registry: &ServiceRegistry) -> Materialised {
        (self.factory)(registry)
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServiceDescriptor")
            .field("service", &self.service)
            .field("metadata", &self.metadata)
            .field("disposable", &self.disposable)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::dispose::DisposeError;

    struct Plain;

    struct Handle;

    impl Dispose for Handle {
        fn dispose(&self) -> Result<(), DisposeError> {
            Ok(())
        }
    }

    #[rstest]
    #[case(ServiceScope::Any, ServerKind::Markup, true)]
    #[case(ServiceScope::Only(ServerKind::Markup), ServerKind::Markup, true)]
    #[case(ServiceScope::Only(ServerKind::Markup), ServerKind::Language, false)]
    fn scope_filters_by_kind(
        #[case] scope: ServiceScope,
        #[case] kind: ServerKind,
        #[case] expected: bool,
    ) {
        assert_eq!(scope.applies_to(kind), expected);
    }

    #[test]
    fn service_types_compare_by_identity() {
        assert_eq!(ServiceType::of::<Plain>(), ServiceType::of::<Plain>());
        assert_ne!(ServiceType::of::<Plain>(), ServiceType::of::<Handle>());
        assert!(ServiceType::of::<Plain>().name().ends_with("Plain"));
    }

    #[test]
    fn disposal_tracking_requires_stateful_disposable() {
        let plain = ServiceDescriptor::new(|_| Plain);
        let stateful = ServiceDescriptor::disposable(|_| Handle);
        let stateless = ServiceDescriptor::disposable(|_| Handle).stateless();

        assert!(!plain.tracks_disposal());
        assert!(stateful.tracks_disposal());
        assert!(stateless.is_disposable());
        assert!(!stateless.tracks_disposal());
    }

    #[test]
    fn scoping_updates_metadata() {
        let descriptor = ServiceDescriptor::new(|_| Plain).scoped_to(ServerKind::Collaboration);
        assert_eq!(
            descriptor.metadata().scope,
            ServiceScope::Only(ServerKind::Collaboration)
        );
        assert_eq!(descriptor.metadata().scope.to_string(), "collaboration");
        assert!(!descriptor.metadata().stateless);
    }
}
