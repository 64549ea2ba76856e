//! Shared configuration for the Weaver checksum and service core.
//!
//! [`HostConfig`] carries the settings consumed by the service registry (its
//! [`ServerKind`] scope tag), the checksum cache and the telemetry
//! subscriber. Values are layered by `ortho_config` in increasing
//! precedence: built-in defaults, a TOML configuration file named by
//! `--config-path` or `WEAVER_CONFIG_PATH`, `WEAVER_*` environment variables,
//! then command-line flags such as `--server-kind`.

mod defaults;
mod error;
mod logging;
mod server_kind;

use std::ffi::OsString;
use std::num::NonZeroUsize;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CHECKSUM_CACHE_CAPACITY, DEFAULT_LOG_FILTER, default_checksum_cache_capacity,
    default_log_filter, default_log_filter_string, default_log_format, default_server_kind,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};
pub use server_kind::{ServerKind, ServerKindParseError};

/// Environment variable naming the TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "WEAVER_CONFIG_PATH";
/// Environment variable overriding [`HostConfig::server_kind`].
pub const SERVER_KIND_ENV: &str = "WEAVER_SERVER_KIND";
/// Environment variable overriding [`HostConfig::log_filter`].
pub const LOG_FILTER_ENV: &str = "WEAVER_LOG_FILTER";
/// Environment variable overriding [`HostConfig::log_format`].
pub const LOG_FORMAT_ENV: &str = "WEAVER_LOG_FORMAT";
/// Environment variable overriding [`HostConfig::checksum_cache_capacity`].
pub const CHECKSUM_CACHE_CAPACITY_ENV: &str = "WEAVER_CHECKSUM_CACHE_CAPACITY";

/// Resolved host configuration.
///
/// Fields missing from every layer keep their [`Default`] values. A zero
/// cache capacity is rejected by whichever layer supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(prefix = "WEAVER")]
pub struct HostConfig {
    /// Scope tag applied when building a service registry.
    pub server_kind: ServerKind,
    /// `tracing-subscriber` filter expression.
    pub log_filter: String,
    /// Output format of the telemetry subscriber.
    pub log_format: LogFormat,
    /// Number of entries memoised by a checksum cache.
    pub checksum_cache_capacity: NonZeroUsize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            server_kind: default_server_kind(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            checksum_cache_capacity: default_checksum_cache_capacity(),
        }
    }
}

impl HostConfig {
    /// Loads the configuration for the current process: its arguments, its
    /// environment and any configuration file they name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when any layer fails to load or merge.
    pub fn load_for_process() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args_os())
    }

    /// Loads the configuration from an explicit argument list. The first
    /// item is the program name, as with [`std::env::args_os`]; environment
    /// variables and configuration files are still consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when any layer fails to load or merge.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::load_from_iter(args).map_err(ConfigError::Load)
    }

    /// Scope tag used when building a service registry.
    #[must_use]
    pub const fn server_kind(&self) -> ServerKind {
        self.server_kind
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Telemetry output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Capacity of checksum caches built from this configuration.
    #[must_use]
    pub const fn checksum_cache_capacity(&self) -> NonZeroUsize {
        self.checksum_cache_capacity
    }
}
