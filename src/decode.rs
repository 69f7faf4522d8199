//! Package buffer decoding.
//!
//! [`decode_all`] turns a batch of named archive buffers into structured
//! entry lists, one per package. A buffer that fails to decode never affects
//! its siblings: the failure is recorded in the outcome and the remaining
//! packages decode normally.
//!
//! Decoding also settles everything about an entry that later layers need.
//! Names are validated into [`EntryPath`]s, noise entries are dropped, and
//! file contents are extracted and UTF-8 decoded here, so tree projection
//! and content lookup work on plain data with no archive access.

use std::collections::BTreeMap;
use std::io::Cursor;

use log::{debug, warn};

use crate::entry_path::EntryPath;
use crate::zip::ZipArchive;
use crate::{Error, Result};

/// Top-level archive directories dropped during decoding, alongside any
/// root whose name starts with a dot.
pub const NOISE_ROOTS: [&str; 2] = ["windows", "__MACOSX"];

/// Resource ceilings applied while decoding a single package buffer.
///
/// The defaults are sized for package archives (documentation, sources,
/// small assets). Raise them with the builder methods when decoding
/// trusted input:
///
/// ```rust
/// use paktree::DecodeLimits;
///
/// let limits = DecodeLimits::default()
///     .with_max_entries(50_000)
///     .with_max_total_size(1024 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of central directory entries accepted per archive.
    pub max_entries: usize,
    /// Maximum declared uncompressed size of a single entry, in bytes.
    /// Larger entries stay in the tree but their content is not extracted.
    pub max_entry_size: u64,
    /// Maximum accumulated uncompressed size per archive, in bytes.
    /// Crossing it fails the whole package.
    pub max_total_size: u64,
}

impl DecodeLimits {
    /// Default cap on entries per archive.
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
    /// Default cap on a single entry's uncompressed size (16 MiB).
    pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 16 * 1024 * 1024;
    /// Default cap on an archive's accumulated uncompressed size (256 MiB).
    pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 256 * 1024 * 1024;

    /// Replaces the entry count cap.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Replaces the single-entry size cap.
    #[must_use]
    pub fn with_max_entry_size(mut self, max_entry_size: u64) -> Self {
        self.max_entry_size = max_entry_size;
        self
    }

    /// Replaces the accumulated size cap.
    #[must_use]
    pub fn with_max_total_size(mut self, max_total_size: u64) -> Self {
        self.max_total_size = max_total_size;
        self
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            max_entry_size: Self::DEFAULT_MAX_ENTRY_SIZE,
            max_total_size: Self::DEFAULT_MAX_TOTAL_SIZE,
        }
    }
}

/// A named archive buffer awaiting decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageBuffer {
    /// Package the buffer belongs to.
    pub package_name: String,
    /// Raw archive bytes.
    pub bytes: Vec<u8>,
}

impl PackageBuffer {
    /// Creates a named buffer.
    pub fn new(package_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            package_name: package_name.into(),
            bytes,
        }
    }
}

/// One decoded archive entry.
///
/// `text` is `Some` only for file entries whose content was extracted and
/// is valid UTF-8. Directories, oversized entries, and entries that failed
/// extraction or UTF-8 decoding all carry `None` but remain part of the
/// entry list, so the tree still shows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Validated path relative to the package root.
    pub path: EntryPath,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Extracted text content, when available.
    pub text: Option<String>,
}

impl ArchiveEntry {
    /// Creates an entry.
    pub fn new(path: EntryPath, is_directory: bool, text: Option<String>) -> Self {
        Self {
            path,
            is_directory,
            text,
        }
    }

    /// Creates a file entry.
    pub fn file(path: EntryPath, text: Option<String>) -> Self {
        Self::new(path, false, text)
    }

    /// Creates a directory entry.
    pub fn directory(path: EntryPath) -> Self {
        Self::new(path, true, None)
    }
}

/// A package whose buffer could not be decoded.
#[derive(Debug, thiserror::Error)]
#[error("error processing archive from {package_name}: {error}")]
pub struct PackageFailure {
    /// Package the failed buffer belonged to.
    pub package_name: String,
    /// What went wrong.
    #[source]
    pub error: Error,
}

/// Result of decoding a batch of package buffers.
#[derive(Debug, Default)]
pub struct DecodeOutcome {
    /// Successfully decoded packages, keyed by package name.
    pub packages: BTreeMap<String, Vec<ArchiveEntry>>,
    /// Packages whose buffers failed to decode.
    pub failures: Vec<PackageFailure>,
}

impl DecodeOutcome {
    /// Folds per-package results into an outcome, logging each failure.
    pub fn from_results(results: Vec<(String, Result<Vec<ArchiveEntry>>)>) -> Self {
        let mut outcome = Self::default();
        for (package_name, result) in results {
            match result {
                Ok(entries) => {
                    outcome.packages.insert(package_name, entries);
                }
                Err(error) => {
                    warn!("error processing archive from {}: {}", package_name, error);
                    outcome.failures.push(PackageFailure {
                        package_name,
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Returns `true` when nothing decoded and nothing failed.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.failures.is_empty()
    }
}

/// Decodes every buffer in the batch, isolating failures per package.
///
/// This never fails as a whole: a corrupt buffer lands in
/// [`DecodeOutcome::failures`] while the other packages decode normally.
pub fn decode_all(buffers: &[PackageBuffer], limits: &DecodeLimits) -> DecodeOutcome {
    let results = buffers
        .iter()
        .map(|buffer| {
            let result = decode_package(&buffer.package_name, &buffer.bytes, limits);
            (buffer.package_name.clone(), result)
        })
        .collect();
    DecodeOutcome::from_results(results)
}

/// Decodes one package buffer into its entry list.
///
/// Entry names are normalized (trailing `/` stripped) and validated; noise
/// entries and invalid names are dropped with a log line. Extraction
/// problems on a single entry degrade that entry to `text: None` rather
/// than failing the package.
///
/// # Errors
///
/// Fails only for package-level problems: a buffer that is not a valid
/// archive, a damaged central directory, or a breach of the entry count or
/// total size limits.
pub fn decode_package(
    package_name: &str,
    bytes: &[u8],
    limits: &DecodeLimits,
) -> Result<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::open(Cursor::new(bytes))?;

    if archive.len() > limits.max_entries {
        return Err(Error::limit_exceeded(format!(
            "archive lists {} entries, limit is {}",
            archive.len(),
            limits.max_entries
        )));
    }

    let mut entries = Vec::with_capacity(archive.len());
    let mut total_size = 0u64;

    for index in 0..archive.len() {
        let raw = &archive.entries()[index];
        let name = raw.name.clone();
        let is_directory = raw.is_directory;
        let declared_size = raw.uncompressed_size;

        let trimmed = name.strip_suffix('/').unwrap_or(&name);
        if trimmed.is_empty() {
            debug!("{}: skipping unnamed entry", package_name);
            continue;
        }
        if is_noise(trimmed) {
            debug!("{}: skipping noise entry {}", package_name, trimmed);
            continue;
        }
        let path = match EntryPath::new(trimmed) {
            Ok(path) => path,
            Err(error) => {
                warn!("{}: skipping entry with invalid name: {}", package_name, error);
                continue;
            }
        };

        if is_directory {
            entries.push(ArchiveEntry::directory(path));
            continue;
        }

        if declared_size > limits.max_entry_size {
            warn!(
                "{}: entry {} declares {} bytes, limit is {}; content not extracted",
                package_name, path, declared_size, limits.max_entry_size
            );
            entries.push(ArchiveEntry::file(path, None));
            continue;
        }

        total_size += declared_size;
        if total_size > limits.max_total_size {
            return Err(Error::limit_exceeded(format!(
                "archive exceeds total size limit of {} bytes",
                limits.max_total_size
            )));
        }

        let text = match archive.read_to_vec(index) {
            Ok(data) => match String::from_utf8(data) {
                Ok(text) => Some(text),
                Err(_) => {
                    debug!("{}: entry {} is not UTF-8 text", package_name, path);
                    None
                }
            },
            Err(error) => {
                warn!(
                    "{}: failed to extract entry {}: {}",
                    package_name, path, error
                );
                None
            }
        };
        entries.push(ArchiveEntry::file(path, text));
    }

    Ok(entries)
}

/// Returns `true` for entries under a dot-prefixed or well-known junk root.
fn is_noise(trimmed_name: &str) -> bool {
    match trimmed_name.split('/').next() {
        Some(root) => root.starts_with('.') || NOISE_ROOTS.contains(&root),
        None => false,
    }
}
