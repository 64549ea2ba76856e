//! Process-wide `tracing` subscriber for hosts that own a service registry.
//!
//! The registry and the checksum cache emit events under fixed targets:
//! `weaver_services::registry` for resolution and shutdown,
//! `weaver_services::faults` for disposal faults reported by
//! [`crate::StructuredFaultReporter`] and `weaver_checksum::cache` for
//! evictions. A host calls [`initialise`] once, before building its first
//! registry, so those events reach stderr in the layout chosen by
//! [`HostConfig::log_format`] and filtered by [`HostConfig::log_filter`].

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use weaver_config::{HostConfig, LogFormat};

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the host's subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Layout of the installed subscriber. This is the layout requested by
    /// the first successful [`initialise`] call, whatever later calls asked
    /// for.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Expression taken from [`HostConfig::log_filter`].
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another subscriber was installed without going through [`initialise`].
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[source] SetGlobalDefaultError),
}

/// Installs the global subscriber for a registry host.
///
/// The first successful call installs the subscriber described by `config`.
/// Later calls leave it in place and return a handle reporting the layout
/// that was installed, so hosts that build several registries can call this
/// before each one.
///
/// # Examples
///
/// ```
/// use weaver_config::{HostConfig, LogFormat};
/// use weaver_services::telemetry;
///
/// # fn main() -> Result<(), telemetry::TelemetryError> {
/// let config = HostConfig::default();
/// let first = telemetry::initialise(&config)?;
///
/// let compact = HostConfig {
///     log_format: LogFormat::Compact,
///     ..HostConfig::default()
/// };
/// let second = telemetry::initialise(&compact)?;
///
/// assert_eq!(first.format(), LogFormat::Json);
/// assert_eq!(second.format(), LogFormat::Json);
/// assert_eq!(telemetry::installed_format(), Some(LogFormat::Json));
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the log filter does not parse and
/// [`TelemetryError::Subscriber`] when a subscriber was already installed
/// elsewhere in the process.
pub fn initialise(config: &HostConfig) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED_FORMAT
        .get_or_try_init(|| install_subscriber(config).map(|()| config.log_format()))
        .map(|format| TelemetryHandle { format: *format })
}

/// Returns `true` once [`initialise`] has installed a subscriber.
#[must_use]
pub fn is_initialised() -> bool {
    INSTALLED_FORMAT.get().is_some()
}

/// Layout of the subscriber installed by [`initialise`], if any.
#[must_use]
pub fn installed_format() -> Option<LogFormat> {
    INSTALLED_FORMAT.get().copied()
}

fn install_subscriber(config: &HostConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        filter: config.log_filter().to_owned(),
        message: error.to_string(),
    })?;

    // Colour only helps people reading a terminal; shipped JSON stays plain.
    let ansi = !config.log_format().is_structured() && io::stderr().is_terminal();
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
        LogFormat::Full => Box::new(builder.with_thread_names(true).finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
