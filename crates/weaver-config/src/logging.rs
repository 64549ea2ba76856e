//! Event layouts for the telemetry subscriber.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the telemetry subscriber lays out each event.
///
/// `json` suits log shippers; `compact` and `full` are for people reading a
/// terminal, `full` keeping span context on every line.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event.
    #[default]
    Json,
    /// Abbreviated single-line text.
    Compact,
    /// Single-line text including the enclosing spans.
    Full,
}

impl LogFormat {
    /// Returns `true` for machine-readable layouts.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error raised when a [`LogFormat`] cannot be parsed from text.
pub type LogFormatParseError = strum::ParseError;
