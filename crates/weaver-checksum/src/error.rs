//! Errors raised when decoding checksums from external representations.

use thiserror::Error;

/// Errors produced when a [`crate::Checksum`] cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumParseError {
    /// The input did not have the expected width.
    #[error("expected {expected} {unit}, found {actual}")]
    InvalidLength {
        /// Required width.
        expected: usize,
        /// Width that was supplied.
        actual: usize,
        /// Unit of the width (`bytes` or `hex digits`).
        unit: &'static str,
    },
    /// A hex digit was not in `[0-9a-fA-F]`.
    #[error("invalid hex digit {character:?} at position {position}")]
    InvalidDigit {
        /// Zero-based offset of the offending character.
        position: usize,
        /// Character that failed to decode.
        character: char,
    },
}
