use std::num::NonZeroUsize;

use crate::logging::LogFormat;
use crate::server_kind::ServerKind;

/// Default log filter expression applied to the tracing subscriber.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default number of checksums memoised by a checksum cache.
pub const DEFAULT_CHECKSUM_CACHE_CAPACITY: usize = 1024;

/// Default log filter expression.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default server kind used to scope registered services.
#[must_use]
pub fn default_server_kind() -> ServerKind {
    ServerKind::Language
}

/// Default checksum cache capacity.
#[must_use]
pub fn default_checksum_cache_capacity() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CHECKSUM_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN)
}
