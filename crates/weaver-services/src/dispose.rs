//! Teardown hook for services that own resources.

use std::sync::Arc;

use thiserror::Error;

/// Implemented by services that must release resources when their registry
/// shuts down.
///
/// Disposal runs at most once per tracked instance. Implementations should
/// leave the instance in a state where further calls are harmless, since
/// other holders of the `Arc` may still reach it.
pub trait Dispose: Send + Sync {
    /// Releases the resources held by the service.
    ///
    /// # Errors
    ///
    /// Returns a [`DisposeError`] when teardown fails. The registry reports the
    /// error and continues disposing the remaining services.
    fn dispose(&self) -> Result<(), DisposeError>;
}

impl<T> Dispose for Arc<T>
where
    T: Dispose + ?Sized,
{
    fn dispose(&self) -> Result<(), DisposeError> {
        (**self).dispose()
    }
}

/// Failure raised by a [`Dispose`] implementation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DisposeError {
    message: String,
    /// Optional underlying cause.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DisposeError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl From<std::io::Error> for DisposeError {
    fn from(error: std::io::Error) -> Self {
        Self::with_source("i/o failure during disposal", error)
    }
}
