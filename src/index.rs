//! Content lookup by qualified path.

use std::collections::{BTreeMap, HashMap};

use crate::decode::ArchiveEntry;

/// Joins a package name and a package-relative path into a qualified path.
pub fn qualify(package_name: &str, relative_path: &str) -> String {
    format!("{}/{}", package_name, relative_path)
}

/// Extracted text content of every readable file, keyed by qualified path.
///
/// Only file entries whose content was extracted as UTF-8 text appear here.
/// Directories and unreadable files are part of the tree but have no index
/// entry, which is exactly the distinction [`current_content`] consumers
/// rely on.
///
/// [`current_content`]: crate::Explorer::current_content
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    entries: HashMap<String, String>,
}

impl ContentIndex {
    /// Builds the index from decoded packages, taking ownership of the
    /// extracted text.
    ///
    /// When an archive lists the same path twice, the later entry wins,
    /// matching the order the archive's central directory presents them.
    pub fn from_packages(packages: BTreeMap<String, Vec<ArchiveEntry>>) -> Self {
        let mut entries = HashMap::new();
        for (package_name, package_entries) in packages {
            for entry in package_entries {
                if entry.is_directory {
                    continue;
                }
                if let Some(text) = entry.text {
                    entries.insert(qualify(&package_name, entry.path.as_str()), text);
                }
            }
        }
        Self { entries }
    }

    /// Looks up the content behind a qualified path.
    pub fn get(&self, qualified_path: &str) -> Option<&str> {
        self.entries.get(qualified_path).map(String::as_str)
    }

    /// Returns the number of indexed files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no file content is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
