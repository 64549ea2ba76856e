//! Byte sink handed to serialisers by [`crate::Checksum::create_with`].

use std::io;

use xxhash_rust::xxh3::Xxh3;

use crate::Checksum;

/// Streams a serialiser's output straight into the running digest.
///
/// The sink implements [`io::Write`], so any serialiser that targets a writer
/// can be used. The typed helpers fix an encoding for common primitives:
/// integers are little-endian and strings are length-prefixed, which keeps
/// adjacent fields from running into each other (`"ab", "c"` and `"a", "bc"`
/// produce different byte streams).
///
/// Writes never fail.
pub struct ChecksumWriter<'a> {
    hasher: &'a mut Xxh3,
    written: u64,
}

impl<'a> ChecksumWriter<'a> {
    pub(crate) fn new(hasher: &'a mut Xxh3) -> Self {
        Self { hasher, written: 0 }
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
        self.written = self
            .written
            .saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }

    /// Appends a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    /// Appends a boolean as one byte (`0` or `1`).
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Appends a `u32` in little-endian order.
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Appends a `u64` in little-endian order.
    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Appends an `i64` in little-endian order.
    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Appends a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, value: &str) {
        self.write_u64(u64::try_from(value.len()).unwrap_or(u64::MAX));
        self.write_bytes(value.as_bytes());
    }

    /// Appends the fixed-width form of a nested checksum.
    ///
    /// Serialisers use this to reference already-fingerprinted children (or to
    /// stand in for back-edges of a cyclic graph) instead of re-serialising
    /// them.
    pub fn write_checksum(&mut self, checksum: Checksum) {
        self.write_bytes(checksum.as_bytes());
    }

    /// Number of bytes fed to the digest so far.
    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.written
    }
}

impl io::Write for ChecksumWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
