//! Shared test utilities for integration tests.
//!
//! This module provides common helper functions used across multiple test
//! files. Archive and envelope fixture builders are consolidated here to
//! avoid duplication.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use paktree::zip::records;

/// Builds in-memory ZIP fixtures entry by entry.
///
/// The builder writes well-formed local headers and central directory
/// records for every entry, then appends the end-of-central-directory
/// record in [`build`](Self::build). For malformed-input tests,
/// [`raw_entry`](Self::raw_entry) gives full control over the recorded
/// method, sizes, and CRC.
///
/// # Example
///
/// ```ignore
/// let bytes = ZipBuilder::new()
///     .directory("src")
///     .file("src/lib.rs", b"pub fn hello() {}")
///     .file("readme.md", b"# Demo")
///     .build();
/// ```
#[derive(Default)]
pub struct ZipBuilder {
    locals: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl ZipBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stored (uncompressed) file entry.
    pub fn file(self, name: &str, data: &[u8]) -> Self {
        let crc = crc32fast::hash(data);
        self.raw_entry(
            name,
            records::METHOD_STORED,
            data,
            data.len() as u32,
            crc,
            0,
        )
    }

    /// Adds a deflated file entry.
    #[cfg(feature = "deflate")]
    pub fn deflated_file(self, name: &str, data: &[u8]) -> Self {
        use std::io::Write;

        let mut encoder =
            flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        let crc = crc32fast::hash(data);
        self.raw_entry(
            name,
            records::METHOD_DEFLATE,
            &compressed,
            data.len() as u32,
            crc,
            0,
        )
    }

    /// Adds a directory entry, marked with both a trailing slash in the
    /// name (if missing) and the MS-DOS directory attribute.
    pub fn directory(self, name: &str) -> Self {
        let slashed = if name.ends_with('/') {
            name.to_string()
        } else {
            format!("{}/", name)
        };
        self.raw_entry(
            &slashed,
            records::METHOD_STORED,
            &[],
            0,
            0,
            records::DOS_DIRECTORY_ATTRIBUTE,
        )
    }

    /// Adds an entry with full control over the recorded fields.
    ///
    /// `stored_bytes` is written verbatim as the entry's data; the central
    /// directory records `uncompressed_size` and `crc` as given, whether or
    /// not they match. Useful for corrupt and unsupported-method fixtures.
    pub fn raw_entry(
        mut self,
        name: &str,
        method: u16,
        stored_bytes: &[u8],
        uncompressed_size: u32,
        crc: u32,
        external_attributes: u32,
    ) -> Self {
        let offset = self.locals.len() as u32;
        let compressed_size = stored_bytes.len() as u32;
        let name_length = name.len() as u16;

        // Local file header (30 bytes + name + data).
        self.locals
            .extend_from_slice(&records::LOCAL_HEADER_SIGNATURE.to_le_bytes());
        self.locals.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.locals.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.locals.extend_from_slice(&method.to_le_bytes());
        self.locals.extend_from_slice(&[0u8; 4]); // mod time, mod date
        self.locals.extend_from_slice(&crc.to_le_bytes());
        self.locals.extend_from_slice(&compressed_size.to_le_bytes());
        self.locals.extend_from_slice(&uncompressed_size.to_le_bytes());
        self.locals.extend_from_slice(&name_length.to_le_bytes());
        self.locals.extend_from_slice(&0u16.to_le_bytes()); // extra length
        self.locals.extend_from_slice(name.as_bytes());
        self.locals.extend_from_slice(stored_bytes);

        // Central directory record (46 bytes + name).
        self.central
            .extend_from_slice(&records::CENTRAL_DIR_SIGNATURE.to_le_bytes());
        self.central.extend_from_slice(&20u16.to_le_bytes()); // version made by
        self.central.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.central.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.central.extend_from_slice(&method.to_le_bytes());
        self.central.extend_from_slice(&[0u8; 4]); // mod time, mod date
        self.central.extend_from_slice(&crc.to_le_bytes());
        self.central.extend_from_slice(&compressed_size.to_le_bytes());
        self.central.extend_from_slice(&uncompressed_size.to_le_bytes());
        self.central.extend_from_slice(&name_length.to_le_bytes());
        self.central.extend_from_slice(&0u16.to_le_bytes()); // extra length
        self.central.extend_from_slice(&0u16.to_le_bytes()); // comment length
        self.central.extend_from_slice(&0u16.to_le_bytes()); // disk number start
        self.central.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
        self.central
            .extend_from_slice(&external_attributes.to_le_bytes());
        self.central.extend_from_slice(&offset.to_le_bytes());
        self.central.extend_from_slice(name.as_bytes());

        self.count += 1;
        self
    }

    /// Finishes the archive, appending the central directory and its end
    /// record.
    pub fn build(self) -> Vec<u8> {
        let cd_offset = self.locals.len() as u32;
        let cd_size = self.central.len() as u32;
        let mut out = self.locals;
        out.extend_from_slice(&self.central);
        out.extend_from_slice(&records::EOCD_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number
        out.extend_from_slice(&0u16.to_le_bytes()); // central dir disk
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // comment length
        out
    }
}

/// Creates an in-memory archive of stored entries.
///
/// Convenience wrapper around [`ZipBuilder`] for the common case where a
/// test just needs files with content.
///
/// # Example
///
/// ```ignore
/// let bytes = zip_of(&[("readme.md", b"# Demo" as &[u8]), ("src/lib.rs", b"")]);
/// ```
pub fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = ZipBuilder::new();
    for (name, data) in entries {
        builder = builder.file(name, data);
    }
    builder.build()
}

/// Creates the 22-byte archive of zero entries.
pub fn empty_zip() -> Vec<u8> {
    ZipBuilder::new().build()
}

/// Serializes named buffers into the JSON envelope shape.
///
/// # Example
///
/// ```ignore
/// let json = envelope_json(&[("alpha", zip_of(&[("a.md", b"# A" as &[u8])]))]);
/// ```
pub fn envelope_json(packages: &[(&str, Vec<u8>)]) -> String {
    let downloads: Vec<serde_json::Value> = packages
        .iter()
        .map(|(name, bytes)| {
            serde_json::json!({
                "packageName": name,
                "buffer": { "type": "Buffer", "data": bytes }
            })
        })
        .collect();
    serde_json::Value::Array(downloads).to_string()
}

/// Extracts the error from a Result, panicking if it's Ok.
///
/// # Panics
///
/// Panics if the result is `Ok(_)`.
pub fn expect_err<T>(result: paktree::Result<T>, context: &str) -> paktree::Error {
    match result {
        Ok(_) => panic!("expected an error: {}", context),
        Err(error) => error,
    }
}
