//! Error types for package-archive decoding and exploration.
//!
//! This module provides the [`Error`] enum which represents all failure modes
//! when parsing ZIP buffers, decoding packages, or consuming the transport
//! envelope, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`:
//!
//! ```rust
//! use paktree::{DecodeLimits, Result, decode_package};
//!
//! fn entry_count(name: &str, bytes: &[u8]) -> Result<usize> {
//!     let entries = decode_package(name, bytes, &DecodeLimits::default())?;
//!     Ok(entries.len())
//! }
//! ```
//!
//! Decode errors are normally captured per package rather than propagated: see
//! [`decode_all`](crate::decode_all) and
//! [`PackageFailure`](crate::PackageFailure). Only the explorer surface keeps
//! them as state; lower layers return them through `Result` as usual.

use std::io;

/// The main error type for archive decoding operations.
///
/// Each variant carries the context needed to diagnose the failure. Errors
/// from one package's buffer never abort the decoding of other packages; the
/// per-package isolation happens in [`decode_all`](crate::decode_all), which
/// converts them into recorded [`PackageFailure`](crate::PackageFailure)s.
///
/// # Error Categories
///
/// | Category   | Variants                                        |
/// |------------|-------------------------------------------------|
/// | I/O        | [`Io`][Self::Io]                                |
/// | Format     | [`InvalidFormat`][Self::InvalidFormat], [`CorruptRecord`][Self::CorruptRecord] |
/// | Compatibility | [`UnsupportedMethod`][Self::UnsupportedMethod] |
/// | Integrity  | [`CrcMismatch`][Self::CrcMismatch]              |
/// | Resources  | [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] |
/// | Paths      | [`InvalidEntryPath`][Self::InvalidEntryPath]    |
/// | Transport  | [`Envelope`][Self::Envelope]                    |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading archive bytes.
    ///
    /// The readers in this crate operate over in-memory cursors, so this
    /// mostly surfaces as `UnexpectedEof` from truncated buffers.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The buffer is not a recognizable ZIP archive.
    ///
    /// This error occurs when:
    /// - No end-of-central-directory record exists in the buffer
    /// - The archive is multi-disk or uses ZIP64 extensions
    ///
    /// The string describes what was expected vs. found.
    #[error("invalid archive format: {0}")]
    InvalidFormat(String),

    /// An archive record is corrupt or truncated.
    ///
    /// The buffer looked like a ZIP archive but a record signature or field
    /// did not hold up during parsing. The offset locates the corruption
    /// within the buffer.
    #[error("corrupt record at offset {offset:#x}: {reason}")]
    CorruptRecord {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// An entry uses a compression method not supported by this build.
    ///
    /// Supported methods:
    /// - `0`: stored (uncompressed)
    /// - `8`: deflate (requires the `deflate` feature)
    #[error("unsupported compression method {method_id}")]
    UnsupportedMethod {
        /// The ZIP method ID that is not supported.
        method_id: u16,
    },

    /// The CRC-32 checksum of extracted data does not match the archive.
    ///
    /// The entry's bytes differ from what was originally archived. Other
    /// entries in the same archive may still be valid.
    #[error("CRC mismatch for entry '{entry_name}': expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        /// The entry name with the CRC mismatch.
        entry_name: String,
        /// The expected CRC value from the central directory.
        expected: u32,
        /// The actual CRC value of the extracted data.
        actual: u32,
    },

    /// A resource limit was exceeded during decoding.
    ///
    /// This protects against hostile archives (e.g. "zip bombs") that declare
    /// huge entry counts or decompress to extreme sizes. Limits are configured
    /// through [`DecodeLimits`](crate::DecodeLimits).
    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// An entry path failed validation.
    ///
    /// Entry paths must be non-empty relative paths with no NUL bytes, no
    /// trailing separator, and no empty, `.`, or `..` segments. See
    /// [`EntryPath::new`](crate::EntryPath::new).
    #[error("invalid entry path: {0}")]
    InvalidEntryPath(String),

    /// The transport envelope JSON could not be parsed.
    ///
    /// Surfaced as a transport-class failure: the explorer clears its tree
    /// and records the message rather than showing partial data.
    #[error("invalid envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if this is a data corruption error.
    ///
    /// Corruption errors indicate the buffer was damaged (or truncated) after
    /// the archive was produced; the package may partially decode.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::CrcMismatch { .. } | Error::CorruptRecord { .. }
        )
    }

    /// Returns `true` if this error is caused by an unsupported archive
    /// feature rather than bad data.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedMethod { .. })
    }

    /// Returns `true` if this error belongs to the transport layer (the
    /// envelope fetch/parse) rather than to a single package's archive.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Envelope(_))
    }

    /// Returns the entry name associated with this error, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Error::CrcMismatch { entry_name, .. } => Some(entry_name.as_str()),
            _ => None,
        }
    }

    /// Creates an `InvalidFormat` error.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Error::InvalidFormat(reason.into())
    }

    /// Creates a `CorruptRecord` error.
    pub fn corrupt_record(offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptRecord {
            offset,
            reason: reason.into(),
        }
    }

    /// Creates a `CrcMismatch` error.
    pub fn crc_mismatch(entry_name: impl Into<String>, expected: u32, actual: u32) -> Self {
        Error::CrcMismatch {
            entry_name: entry_name.into(),
            expected,
            actual,
        }
    }

    /// Creates a `ResourceLimitExceeded` error.
    pub fn limit_exceeded(reason: impl Into<String>) -> Self {
        Error::ResourceLimitExceeded(reason.into())
    }

    /// Creates an `InvalidEntryPath` error.
    pub fn invalid_entry_path(reason: impl Into<String>) -> Self {
        Error::InvalidEntryPath(reason.into())
    }
}

/// A specialized Result type for archive decoding operations.
///
/// Defined as `std::result::Result<T, Error>` for convenience.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_envelope_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Envelope(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn test_invalid_format_display() {
        let err = Error::invalid_format("missing end of central directory");
        assert_eq!(
            err.to_string(),
            "invalid archive format: missing end of central directory"
        );
    }

    #[test]
    fn test_corrupt_record_display_includes_offset() {
        let err = Error::corrupt_record(0x20, "bad signature");
        let msg = err.to_string();
        assert!(msg.contains("0x20"), "missing offset in: {}", msg);
        assert!(msg.contains("bad signature"));
    }

    #[test]
    fn test_crc_mismatch_display() {
        let err = Error::crc_mismatch("lib/a.dart", 0xDEADBEEF, 0x12345678);
        let msg = err.to_string();
        assert!(msg.contains("lib/a.dart"));
        assert!(msg.contains("0xdeadbeef"));
        assert!(msg.contains("0x12345678"));
    }

    #[test]
    fn test_unsupported_method_display() {
        let err = Error::UnsupportedMethod { method_id: 12 };
        assert_eq!(err.to_string(), "unsupported compression method 12");
    }

    #[test]
    fn test_is_corruption() {
        assert!(Error::crc_mismatch("a", 1, 2).is_corruption());
        assert!(Error::corrupt_record(0, "x").is_corruption());
        assert!(!Error::invalid_format("x").is_corruption());
        assert!(!Error::UnsupportedMethod { method_id: 9 }.is_corruption());
    }

    #[test]
    fn test_is_unsupported() {
        assert!(Error::UnsupportedMethod { method_id: 9 }.is_unsupported());
        assert!(!Error::invalid_format("x").is_unsupported());
    }

    #[test]
    fn test_is_transport() {
        let json_err = serde_json::from_str::<serde_json::Value>("").unwrap_err();
        assert!(Error::Envelope(json_err).is_transport());
        assert!(!Error::invalid_format("x").is_transport());
    }

    #[test]
    fn test_entry_name_accessor() {
        let err = Error::crc_mismatch("src/main.dart", 1, 2);
        assert_eq!(err.entry_name(), Some("src/main.dart"));
        assert_eq!(Error::invalid_format("x").entry_name(), None);
    }

    #[test]
    fn test_limit_exceeded_constructor() {
        let err = Error::limit_exceeded("too many entries: 20000 > 10000");
        assert!(matches!(err, Error::ResourceLimitExceeded(_)));
        assert!(err.to_string().contains("too many entries"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
