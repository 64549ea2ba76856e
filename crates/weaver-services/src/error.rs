//! Errors surfaced by the service registry.

use thiserror::Error;

use crate::descriptor::ServiceType;
use crate::dispose::DisposeError;

/// Faults raised while resolving or tearing down services.
///
/// [`RegistryError::MissingService`] and [`RegistryError::ConstructionFailed`]
/// reach callers only as panic messages of the resolution methods on
/// [`crate::ServiceRegistry`]. Disposal faults go to the registry's
/// [`crate::FaultReporter`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No factory and no secondary container provides the requested type.
    #[error("missing required service {service}")]
    MissingService {
        /// The requested capability type.
        service: ServiceType,
    },
    /// The factory for the requested type panicked. The failure is recorded
    /// and the factory is not run again.
    #[error("factory for service {service} panicked: {message}")]
    ConstructionFailed {
        /// The service whose factory panicked.
        service: ServiceType,
        /// Panic payload, when it was a string.
        message: String,
    },
    /// A tracked service returned an error from [`crate::Dispose::dispose`].
    #[error("failed to dispose service {service}: {source}")]
    Disposal {
        /// The service whose teardown failed.
        service: ServiceType,
        /// Error returned by the service.
        #[source]
        source: DisposeError,
    },
    /// A tracked service panicked during disposal.
    #[error("service {service} panicked during disposal: {message}")]
    DisposalPanicked {
        /// The service whose teardown panicked.
        service: ServiceType,
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl RegistryError {
    /// Capability type the fault concerns.
    #[must_use]
    pub const fn service(&self) -> ServiceType {
        match self {
            Self::MissingService { service }
            | Self::ConstructionFailed { service, .. }
            | Self::Disposal { service, .. }
            | Self::DisposalPanicked { service, .. } => *service,
        }
    }
}
