//! Observer for faults the registry absorbs instead of propagating.

use std::sync::Arc;

use crate::error::RegistryError;

/// Receives faults raised while tearing services down.
pub trait FaultReporter: Send + Sync {
    /// Records `error`. Returns `true` when the fault was handled.
    ///
    /// The registry carries on disposing the remaining services whatever the
    /// return value; it only feeds the shutdown summary.
    fn report(&self, error: &RegistryError) -> bool;
}

impl<T> FaultReporter for Arc<T>
where
    T: FaultReporter + ?Sized,
{
    fn report(&self, error: &RegistryError) -> bool {
        (**self).report(error)
    }
}

/// Default reporter that records faults using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredFaultReporter;

impl StructuredFaultReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FaultReporter for StructuredFaultReporter {
    fn report(&self, error: &RegistryError) -> bool {
        tracing::error!(
            target: "weaver_services::faults",
            service = %error.service(),
            error = %error,
            "service fault"
        );
        true
    }
}
