use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Host configuration a service registry is built for.
///
/// Service providers tag their descriptors with the kinds they apply to; the
/// registry keeps only the descriptors matching its own kind (or the wildcard
/// scope).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ServerKind {
    /// Lightweight host that stays active regardless of the open documents.
    AlwaysActive,
    /// Full semantic host for a programming language.
    #[default]
    Language,
    /// Host serving embedded markup documents.
    Markup,
    /// Host attached to a shared editing session.
    Collaboration,
}

/// Error raised when a [`ServerKind`] cannot be parsed from text.
pub type ServerKindParseError = strum::ParseError;
