//! Secondary lookup consulted by [`crate::ServiceRegistry::get_required`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{ServiceInstance, ServiceType};

/// Externally owned source of ready-made service instances.
///
/// Instances returned here are owned by the container: the registry never
/// memoises or disposes them.
pub trait ServiceContainer: Send + Sync {
    /// Returns the instance registered for `service`, if any.
    ///
    /// The instance must downcast to the type `service` identifies; a
    /// mismatched instance is treated as absent.
    fn resolve(&self, service: ServiceType) -> Option<ServiceInstance>;
}

impl<T> ServiceContainer for Arc<T>
where
    T: ServiceContainer + ?Sized,
{
    fn resolve(&self, service: ServiceType) -> Option<ServiceInstance> {
        (**self).resolve(service)
    }
}

/// In-memory [`ServiceContainer`] holding pre-built instances.
#[derive(Default)]
pub struct InstanceContainer {
    instances: HashMap<TypeId, ServiceInstance>,
}

impl InstanceContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `instance`, replacing any previous instance of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, instance: Arc<T>) -> Option<ServiceInstance> {
        self.instances.insert(TypeId::of::<T>(), instance)
    }

    /// Builder-style variant of [`InstanceContainer::insert`].
    #[must_use]
    pub fn with_instance<T: Any + Send + Sync>(mut self, instance: T) -> Self {
        self.insert(Arc::new(instance));
        self
    }

    /// Number of stored instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` when no instances are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl ServiceContainer for InstanceContainer {
    fn resolve(&self, service: ServiceType) -> Option<ServiceInstance> {
        self.instances.get(&service.id()).cloned()
    }
}

impl std::fmt::Debug for InstanceContainer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("InstanceContainer")
            .field("len", &self.instances.len())
            .finish()
    }
}
