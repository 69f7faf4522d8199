//! Validated relative paths for archive entries.
//!
//! [`EntryPath`] wraps an entry's relative path after validating it, so the
//! projector and the explorer can assume every path they see is a clean,
//! non-empty, forward-slash separated relative path. Container entries whose
//! names fail these checks are skipped by the decoder as non-representable.
//!
//! # Validation Rules
//!
//! A valid entry path:
//! - is not empty and contains no NUL bytes
//! - does not start with `/` (no absolute paths)
//! - does not end with `/` (directory entries are normalized before this)
//! - has no empty segments (`a//b`)
//! - has no `.` or `..` segments (path traversal)
//! - is at most [`MAX_PATH_LENGTH`] bytes
//!
//! # Example
//!
//! ```rust
//! use paktree::EntryPath;
//!
//! let path = EntryPath::new("src/main.dart")?;
//! assert_eq!(path.as_str(), "src/main.dart");
//! assert_eq!(path.depth(), 2);
//! assert_eq!(path.file_name(), "main.dart");
//! assert_eq!(path.extension(), Some("dart"));
//!
//! assert!(EntryPath::new("../escape").is_err());
//! assert!(EntryPath::new("/etc/passwd").is_err());
//! # Ok::<(), paktree::Error>(())
//! ```

use crate::{Error, Result};

/// Maximum allowed byte length of an entry path.
pub const MAX_PATH_LENGTH: usize = 4096;

/// A validated relative path of an archive entry.
///
/// Construction goes through [`EntryPath::new`], which enforces the rules
/// listed in the [module documentation](self). The inner representation is
/// the validated string with `/` separators; ordering and equality are plain
/// string ordering, which keeps path collections lexicographically sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryPath(String);

impl EntryPath {
    /// Creates a validated entry path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryPath`] describing the first rule the
    /// input violates.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    fn validate(path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(Error::invalid_entry_path("path is empty"));
        }
        if path.len() > MAX_PATH_LENGTH {
            return Err(Error::invalid_entry_path(format!(
                "path length {} exceeds maximum {}",
                path.len(),
                MAX_PATH_LENGTH
            )));
        }
        if path.contains('\0') {
            return Err(Error::invalid_entry_path(format!(
                "path contains NUL byte: {:?}",
                path
            )));
        }
        if path.starts_with('/') {
            return Err(Error::invalid_entry_path(format!(
                "absolute paths are not allowed: {:?}",
                path
            )));
        }
        if path.ends_with('/') {
            return Err(Error::invalid_entry_path(format!(
                "trailing separator is not allowed: {:?}",
                path
            )));
        }
        for segment in path.split('/') {
            match segment {
                "" => {
                    return Err(Error::invalid_entry_path(format!(
                        "empty path segment in {:?}",
                        path
                    )));
                }
                "." | ".." => {
                    return Err(Error::invalid_entry_path(format!(
                        "path traversal segment {:?} in {:?}",
                        segment, path
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the path, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns an iterator over the path segments, root-first.
    ///
    /// Validation guarantees every segment is non-empty.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Returns the number of path segments.
    ///
    /// `"src/main.dart"` has depth 2; a top-level file has depth 1.
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    /// Returns the final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the extension of the final segment, if it has one.
    ///
    /// Follows the usual convention: a leading dot does not start an
    /// extension, so `".gitignore"` has none.
    pub fn extension(&self) -> Option<&str> {
        match self.file_name().rsplit_once('.') {
            Some(("", _)) => None,
            Some((_, ext)) => Some(ext),
            None => None,
        }
    }

    /// Returns the first path segment.
    ///
    /// The decoder applies the noise filter to this segment.
    pub fn root_segment(&self) -> &str {
        self.components().next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for EntryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EntryPath {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for EntryPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}
