//! The [`Checksum`] value type and its external representations.

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use hex::FromHexError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ChecksumParseError;

const HEX_WIDTH: usize = Checksum::SIZE * 2;

/// A 128-bit content identity.
///
/// Equality is bitwise. The fixed-width form returned by [`Checksum::as_bytes`]
/// stores the digest little-endian and is the representation shared between
/// processes, so it must not change for a given digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Checksum([u8; Checksum::SIZE]);

impl Checksum {
    /// Width of the fixed-size byte representation.
    pub const SIZE: usize = 16;

    /// All-zero sentinel used where no content has been hashed yet.
    pub const NULL: Self = Self([0; Self::SIZE]);

    /// Wraps an existing fixed-width representation.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a checksum from a raw 128-bit digest.
    #[must_use]
    pub const fn from_digest(digest: u128) -> Self {
        Self(digest.to_le_bytes())
    }

    /// Returns the raw 128-bit digest.
    #[must_use]
    pub const fn to_digest(self) -> u128 {
        u128::from_le_bytes(self.0)
    }

    /// Borrows the fixed-width representation.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }

    /// Returns `true` for the [`Checksum::NULL`] sentinel.
    #[must_use]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Writes the fixed-width representation to `sink`.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by `sink`.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&self.0)
    }

    /// Reads a fixed-width representation written by [`Checksum::write_to`].
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::UnexpectedEof`] when fewer than
    /// [`Checksum::SIZE`] bytes remain, or any error reported by `source`.
    pub fn read_from<R: Read + ?Sized>(source: &mut R) -> io::Result<Self> {
        let mut bytes = [0; Self::SIZE];
        source.read_exact(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Short prefix used by the `Debug` representation.
    fn short_hex(&self) -> String {
        self.to_string().chars().take(12).collect()
    }
}

impl From<[u8; Checksum::SIZE]> for Checksum {
    fn from(bytes: [u8; Checksum::SIZE]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl TryFrom<&[u8]> for Checksum {
    type Error = ChecksumParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; Self::SIZE]>::try_from(bytes)
            .map(Self)
            .map_err(|_| ChecksumParseError::InvalidLength {
                expected: Self::SIZE,
                actual: bytes.len(),
                unit: "bytes",
            })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Checksum({}…)", self.short_hex())
    }
}

impl FromStr for Checksum {
    type Err = ChecksumParseError;

    /// Parses the hex form, case-insensitively. Positions and widths in
    /// errors count characters, not UTF-8 bytes.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let width = input.chars().count();
        if width != HEX_WIDTH {
            return Err(ChecksumParseError::InvalidLength {
                expected: HEX_WIDTH,
                actual: width,
                unit: "hex digits",
            });
        }

        let mut bytes = [0; Self::SIZE];
        hex::decode_to_slice(input, &mut bytes).map_err(|error| digit_error(input, &error))?;
        Ok(Self(bytes))
    }
}

// `hex` counts UTF-8 bytes and reports a single byte as the bad character.
// Once the character count is known to be right, a byte-level failure means
// some character is not an ASCII hex digit; report it by character.
fn digit_error(input: &str, error: &FromHexError) -> ChecksumParseError {
    if let FromHexError::InvalidHexCharacter { c, index } = *error
        && input.is_char_boundary(index)
        && input.get(..index).is_some_and(|prefix| prefix.is_ascii())
    {
        let character = input.get(index..).and_then(|rest| rest.chars().next());
        return ChecksumParseError::InvalidDigit {
            position: index,
            character: character.unwrap_or(c),
        };
    }
    input
        .chars()
        .enumerate()
        .find(|(_, character)| !character.is_ascii_hexdigit())
        .map_or(
            ChecksumParseError::InvalidLength {
                expected: HEX_WIDTH,
                actual: input.len(),
                unit: "bytes",
            },
            |(position, character)| ChecksumParseError::InvalidDigit {
                position,
                character,
            },
        )
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
