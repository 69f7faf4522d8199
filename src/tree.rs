//! Hierarchical projection of flat entry lists.
//!
//! Archive entries arrive as flat slash-separated paths. [`TreeNode`] and
//! [`Forest`] rebuild the directory hierarchy those paths describe: one
//! tree per package, every tree rooted at the package name.
//!
//! A node's kind comes from the decoder, not from path syntax. An entry the
//! archive marked as a directory stays a directory even without a trailing
//! slash, and anything that has children is a directory no matter what else
//! claimed the name.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use log::warn;

use crate::decode::ArchiveEntry;

/// One node in a package tree.
///
/// Children are keyed by component name in a [`BTreeMap`], so iteration
/// order is lexicographic everywhere a tree is walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// An inner node with named children.
    Directory {
        /// Child nodes keyed by their last path component.
        children: BTreeMap<String, TreeNode>,
    },
    /// A leaf node.
    File,
}

impl TreeNode {
    /// Creates an empty directory node.
    pub fn directory() -> Self {
        Self::Directory {
            children: BTreeMap::new(),
        }
    }

    /// Builds a package tree from its decoded entries.
    ///
    /// Parent directories are implied by every path, so entries may arrive
    /// in any order and explicit directory entries are optional. When a
    /// file and a directory claim the same path, the directory wins and the
    /// conflict is logged.
    pub fn from_entries(entries: &[ArchiveEntry]) -> Self {
        let mut root = Self::directory();
        for entry in entries {
            root.insert_entry(entry);
        }
        root
    }

    /// Returns `true` for directory nodes.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// Returns the child map of a directory node.
    pub fn children(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match self {
            Self::Directory { children } => Some(children),
            Self::File => None,
        }
    }

    /// Returns the number of direct children (zero for files).
    pub fn child_count(&self) -> usize {
        self.children().map_or(0, BTreeMap::len)
    }

    /// Looks up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children()?.get(name)
    }

    fn insert_entry(&mut self, entry: &ArchiveEntry) {
        let components: Vec<&str> = entry.path.components().collect();
        let mut cursor = match self {
            Self::Directory { children } => children,
            Self::File => return,
        };

        for (index, component) in components.iter().enumerate() {
            let is_last = index + 1 == components.len();
            let wants_directory = !is_last || entry.is_directory;

            let node = match cursor.entry((*component).to_string()) {
                Entry::Vacant(slot) => slot.insert(if wants_directory {
                    Self::directory()
                } else {
                    Self::File
                }),
                Entry::Occupied(slot) => slot.into_mut(),
            };

            if wants_directory && !node.is_directory() {
                warn!(
                    "path component {} of {} collides with a file; keeping the directory",
                    component, entry.path
                );
                *node = Self::directory();
            } else if !wants_directory && node.is_directory() {
                warn!(
                    "file {} collides with a directory of the same name; keeping the directory",
                    entry.path
                );
            }

            if is_last {
                return;
            }
            cursor = match node {
                Self::Directory { children } => children,
                Self::File => return,
            };
        }
    }
}

/// All package trees of one decoded batch, keyed by package name.
///
/// Node lookups use qualified paths: the package name alone addresses a
/// package root, `package/relative/path` addresses a node inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    roots: BTreeMap<String, TreeNode>,
}

impl Forest {
    /// Projects every package's entry list into its tree.
    ///
    /// Packages with empty entry lists still get a root, so an empty
    /// archive shows up as an empty tree rather than disappearing.
    pub fn project(packages: &BTreeMap<String, Vec<ArchiveEntry>>) -> Self {
        let roots = packages
            .iter()
            .map(|(name, entries)| (name.clone(), TreeNode::from_entries(entries)))
            .collect();
        Self { roots }
    }

    /// Resolves a qualified path to its node.
    pub fn find(&self, qualified_path: &str) -> Option<&TreeNode> {
        let mut segments = qualified_path.split('/');
        let package = segments.next()?;
        let mut node = self.roots.get(package)?;
        for segment in segments {
            node = match node {
                TreeNode::Directory { children } => children.get(segment)?,
                TreeNode::File => return None,
            };
        }
        Some(node)
    }

    /// Returns a package's root node.
    pub fn root(&self, package_name: &str) -> Option<&TreeNode> {
        self.roots.get(package_name)
    }

    /// Iterates package names in lexicographic order.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    /// Returns the number of packages.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` when no packages are present.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
