//! Checksum construction.
//!
//! Every constructor is pure: equal inputs give bitwise-equal checksums across
//! calls, threads and processes. One-shot inputs are hashed directly; inputs
//! that arrive in pieces borrow a streaming state from the shared pool. XXH3's
//! streaming and one-shot forms agree, so the fixed-arity combinators and
//! [`Checksum::combine_all`] produce identical results for the same members.

use std::io::{self, Read};

use serde::Serialize;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

use crate::Checksum;
use crate::pool;
use crate::writer::ChecksumWriter;

const READ_CHUNK: usize = 8 * 1024;
const UTF16_CHUNK: usize = 256;
const SEPARATOR: [u8; 1] = [0];

impl Checksum {
    /// Hashes a byte span.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_digest(xxh3_128(bytes))
    }

    /// Hashes the UTF-8 bytes of a string. The empty string hashes an empty
    /// span.
    #[must_use]
    pub fn of_str(value: &str) -> Self {
        Self::of_bytes(value.as_bytes())
    }

    /// Hashes UTF-16 code units as their little-endian bytes.
    #[must_use]
    pub fn of_utf16(units: &[u16]) -> Self {
        Self::streamed(|hasher| {
            let mut buffer = [0_u8; UTF16_CHUNK * 2];
            for chunk in units.chunks(UTF16_CHUNK) {
                for (slot, unit) in buffer.chunks_exact_mut(2).zip(chunk) {
                    slot.copy_from_slice(&unit.to_le_bytes());
                }
                if let Some(bytes) = buffer.get(..chunk.len() * 2) {
                    hasher.update(bytes);
                }
            }
        })
    }

    /// Hashes a sequence of strings in order, each followed by a NUL byte.
    ///
    /// The separator makes the result depend on how the input is partitioned:
    /// `["a", "b"]`, `["ab"]` and `["b", "a"]` all hash differently. Callers
    /// with optional strings pass `""` for absent values.
    #[must_use]
    pub fn of_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::streamed(|hasher| {
            for value in values {
                hasher.update(value.as_ref().as_bytes());
                hasher.update(&SEPARATOR);
            }
        })
    }

    /// Hashes everything `reader` yields until end of input.
    ///
    /// Interrupted reads are retried.
    ///
    /// # Errors
    ///
    /// Returns the first other read error; the partial digest is discarded.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        pool::shared()
            .with_hasher(|hasher| {
                let mut buffer = [0_u8; READ_CHUNK];
                loop {
                    match reader.read(&mut buffer) {
                        Ok(0) => break,
                        Ok(read) => {
                            if let Some(chunk) = buffer.get(..read) {
                                hasher.update(chunk);
                            }
                        }
                        Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                        Err(error) => return Err(error),
                    }
                }
                Ok(hasher.digest128())
            })
            .map(Self::from_digest)
    }

    /// Hashes the bytes a caller-supplied serialiser writes for `value`.
    ///
    /// The serialiser is responsible for producing the same bytes for
    /// semantically equal values and for terminating on cyclic graphs; the
    /// engine only digests the stream it is given.
    ///
    /// # Errors
    ///
    /// Returns the serialiser's error unchanged.
    ///
    /// ```
    /// use weaver_checksum::Checksum;
    ///
    /// struct Symbol { name: String, arity: u32 }
    ///
    /// let symbol = Symbol { name: "len".into(), arity: 1 };
    /// let checksum = Checksum::create_with(&symbol, |symbol, sink| {
    ///     sink.write_str(&symbol.name);
    ///     sink.write_u32(symbol.arity);
    ///     Ok::<_, std::convert::Infallible>(())
    /// });
    /// assert!(checksum.is_ok());
    /// ```
    pub fn create_with<T, F, E>(value: &T, serialise: F) -> Result<Self, E>
    where
        T: ?Sized,
        F: FnOnce(&T, &mut ChecksumWriter<'_>) -> Result<(), E>,
    {
        pool::shared()
            .with_hasher(|hasher| {
                let mut sink = ChecksumWriter::new(hasher);
                serialise(value, &mut sink)?;
                Ok(hasher.digest128())
            })
            .map(Self::from_digest)
    }

    /// Hashes the serde-JSON encoding of `value`.
    ///
    /// Stable only for types whose serde form is canonical; hash maps with
    /// unspecified iteration order must be replaced by ordered maps first.
    ///
    /// # Errors
    ///
    /// Returns the serialisation error reported by `serde_json`.
    pub fn of_serialize<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        Self::create_with(value, |value, sink| serde_json::to_writer(sink, value))
    }

    /// Combines two checksums in argument order.
    #[must_use]
    pub fn combine(first: Self, second: Self) -> Self {
        Self::concatenated([first, second])
    }

    /// Combines three checksums in argument order.
    #[must_use]
    pub fn combine3(first: Self, second: Self, third: Self) -> Self {
        Self::concatenated([first, second, third])
    }

    /// Combines four checksums in argument order.
    #[must_use]
    pub fn combine4(first: Self, second: Self, third: Self, fourth: Self) -> Self {
        Self::concatenated([first, second, third, fourth])
    }

    /// Combines an ordered sequence of checksums of any length.
    ///
    /// Agrees bit-for-bit with [`Checksum::combine`], [`Checksum::combine3`] and
    /// [`Checksum::combine4`] for sequences of matching length.
    #[must_use]
    pub fn combine_all<I>(checksums: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::streamed(|hasher| {
            for checksum in checksums {
                hasher.update(checksum.as_bytes());
            }
        })
    }

    fn concatenated<const N: usize>(parts: [Self; N]) -> Self {
        let mut buffer = [0_u8; 4 * Self::SIZE];
        for (slot, part) in buffer.chunks_exact_mut(Self::SIZE).zip(&parts) {
            slot.copy_from_slice(part.as_bytes());
        }
        match buffer.get(..N * Self::SIZE) {
            Some(bytes) => Self::of_bytes(bytes),
            None => Self::combine_all(parts),
        }
    }

    fn streamed(feed: impl FnOnce(&mut Xxh3)) -> Self {
        let digest = pool::shared().with_hasher(|hasher| {
            feed(hasher);
            hasher.digest128()
        });
        Self::from_digest(digest)
    }
}
