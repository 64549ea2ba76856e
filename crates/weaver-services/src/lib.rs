//! Lazily constructed, per-registry singleton services.
//!
//! A [`ServiceRegistry`] maps capability types to factories. The first request
//! for a type runs its factory exactly once; every later request on the same
//! registry receives the same [`std::sync::Arc`]. Services that hold resources
//! are registered with [`ServiceDescriptor::disposable`]; when such a service
//! is first resolved (and is not marked stateless) the registry records it and
//! disposes it once, on [`ServiceRegistry::shutdown`].
//!
//! # Building a registry
//!
//! Descriptors arrive from any number of [`ServiceProvider`]s. Each carries a
//! [`ServiceScope`]; only descriptors scoped to the registry's
//! [`weaver_config::ServerKind`] (or to [`ServiceScope::Any`]) are kept. A
//! fixed baseline set is appended afterwards and wins over scoped descriptors
//! for the same type. [`ServiceRegistryBuilder::with_checksum_cache`] adds a
//! baseline [`weaver_checksum::ChecksumCache`] sized by the host
//! configuration.
//!
//! ```
//! use std::sync::Arc;
//!
//! use weaver_config::ServerKind;
//! use weaver_services::{ServiceDescriptor, ServiceRegistryBuilder};
//!
//! struct Formatter {
//!     indent: usize,
//! }
//!
//! let registry = ServiceRegistryBuilder::new(ServerKind::Language)
//!     .with_service(ServiceDescriptor::new(|_| Formatter { indent: 4 }))
//!     .build();
//!
//! let first = registry.get_required::<Formatter>();
//! let second = registry.try_get::<Formatter>().expect("registered");
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(first.indent, 4);
//! registry.shutdown();
//! ```
//!
//! # Failure handling
//!
//! Resolving an unregistered type is not an error: [`ServiceRegistry::try_get`]
//! returns `None`. [`ServiceRegistry::get_required`] treats absence as a
//! programming error and panics. A factory that panics is never re-run: the
//! failure is recorded and every later request for the type panics with
//! [`RegistryError::ConstructionFailed`]. Disposal failures never reach the caller of
//! `shutdown`; each is handed to the configured [`FaultReporter`] and teardown
//! continues with the remaining services.

mod builder;
mod container;
mod descriptor;
mod dispose;
mod error;
mod registry;
mod reporter;
pub mod telemetry;

pub use builder::{ServiceProvider, ServiceRegistryBuilder};
pub use container::{InstanceContainer, ServiceContainer};
pub use descriptor::{ServiceDescriptor, ServiceInstance, ServiceMetadata, ServiceScope, ServiceType};
pub use dispose::{Dispose, DisposeError};
pub use error::RegistryError;
pub use registry::{ServiceRegistry, ShutdownReport};
pub use reporter::{FaultReporter, StructuredFaultReporter};

#[cfg(test)]
mod tests;
