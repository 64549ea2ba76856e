//! Content-addressed checksums for incremental analysis.
//!
//! A [`Checksum`] is a 128-bit identity derived from the bytes of a value. The
//! engine hashes strings, string sequences, byte streams, serialised values and
//! combinations of other checksums with XXH3-128. The digest is fast and well
//! distributed but not cryptographic: checksums key caches and invalidate
//! incremental work, they do not protect against tampering.
//!
//! Complex object graphs become checksums through [`Checksum::create_with`]:
//! the caller's serialiser writes a canonical byte sequence into a
//! [`ChecksumWriter`] and the engine hashes whatever it receives. The engine
//! never traverses the value itself, so breaking cycles and ordering unordered
//! collections is entirely the serialiser's job.
//!
//! ```
//! use weaver_checksum::Checksum;
//!
//! let file = Checksum::of_str("fn main() {}");
//! let options = Checksum::of_strings(["--edition", "2024"]);
//! let project = Checksum::combine(file, options);
//! assert_ne!(project, Checksum::combine(options, file));
//! ```

mod cache;
mod checksum;
mod engine;
mod error;
mod pool;
mod writer;

pub use cache::ChecksumCache;
pub use checksum::Checksum;
pub use error::ChecksumParseError;
pub use writer::ChecksumWriter;

#[cfg(test)]
mod tests;
