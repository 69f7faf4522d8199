//! Exploration state over decoded package trees.
//!
//! [`Explorer`] owns everything a tree browser needs between fetches: the
//! projected [`Forest`], the content index, per-package decode failures,
//! expansion state, and the current selection. Fetch rounds are guarded by
//! a monotonic generation counter so a slow response can never overwrite
//! the state of a newer one.
//!
//! Clicks dispatch on what the decoder said a node is, not on how its path
//! looks: a directory toggles open or closed, a file becomes the selection,
//! and an unknown path is ignored.

use std::collections::HashSet;

use log::{debug, warn};

use crate::decode::{DecodeLimits, DecodeOutcome, PackageBuffer, PackageFailure, decode_all};
use crate::index::{ContentIndex, qualify};
use crate::tree::{Forest, TreeNode};

/// Guard token for one fetch round.
///
/// Issued by [`Explorer::begin_fetch`] and presented back when the round's
/// result arrives. A ticket older than the newest one is stale and its
/// result is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    /// Returns the fetch generation this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// How a selected file's content should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
    /// Rendered markup (Markdown).
    Markup,
    /// Verbatim source text.
    Source,
}

impl DisplayFormat {
    /// Picks the format from a path's file extension.
    ///
    /// `md` and `markdown` extensions (any ASCII case) render as markup;
    /// everything else, including extensionless and dot-prefixed names, is
    /// plain source.
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        match name.rsplit_once('.') {
            Some((stem, extension))
                if !stem.is_empty()
                    && (extension.eq_ignore_ascii_case("md")
                        || extension.eq_ignore_ascii_case("markdown")) =>
            {
                Self::Markup
            }
            _ => Self::Source,
        }
    }
}

/// What the content pane should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentView<'a> {
    /// No file is selected, or the selected file has no readable content.
    NoSelection,
    /// The selected file's extracted text.
    File {
        /// Qualified path of the selected file.
        path: &'a str,
        /// Extracted text content.
        text: &'a str,
        /// Presentation format derived from the file name.
        format: DisplayFormat,
    },
}

/// One visible line of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    /// Qualified path of the node.
    pub path: String,
    /// Last path component; the package name for root rows.
    pub name: String,
    /// Nesting depth, zero for package roots.
    pub depth: usize,
    /// Whether the row is a directory.
    pub is_directory: bool,
    /// Whether the directory is currently expanded. Always `false` for
    /// files.
    pub expanded: bool,
    /// Number of direct children, zero for files.
    pub child_count: usize,
}

/// Exploration state machine over decoded package trees.
///
/// # Example
///
/// ```rust
/// use paktree::{DecodeLimits, Explorer, PackageBuffer};
///
/// let mut explorer = Explorer::new();
/// let buffers: Vec<PackageBuffer> = Vec::new();
/// explorer.load(&buffers, &DecodeLimits::default());
/// assert!(explorer.visible_rows().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct Explorer {
    generation: u64,
    forest: Forest,
    index: ContentIndex,
    failures: Vec<PackageFailure>,
    transport_error: Option<String>,
    expanded: HashSet<String>,
    selected: Option<String>,
}

impl Explorer {
    /// Creates an empty explorer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch round, invalidating every earlier ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Applies a decode outcome, unless its ticket has gone stale.
    ///
    /// On apply the forest, content index, and failure list are replaced,
    /// expansion and selection are reset, and any transport error is
    /// cleared. Returns `false` (leaving all state untouched) when a newer
    /// fetch round has started since the ticket was issued.
    pub fn apply_decode(&mut self, ticket: FetchTicket, outcome: DecodeOutcome) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "dropping decode result for fetch {} (newest is {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.forest = Forest::project(&outcome.packages);
        self.index = ContentIndex::from_packages(outcome.packages);
        self.failures = outcome.failures;
        self.transport_error = None;
        self.expanded.clear();
        self.selected = None;
        true
    }

    /// Records a transport-level failure for a fetch round.
    ///
    /// Unlike a per-package decode failure, a transport failure means no
    /// packages arrived at all, so the whole tree is cleared. Stale tickets
    /// are dropped the same way as in [`apply_decode`](Self::apply_decode).
    pub fn fail_fetch(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "dropping fetch failure for fetch {} (newest is {})",
                ticket.generation, self.generation
            );
            return false;
        }
        let message = message.into();
        warn!("package fetch failed: {}", message);
        self.forest = Forest::default();
        self.index = ContentIndex::default();
        self.failures.clear();
        self.expanded.clear();
        self.selected = None;
        self.transport_error = Some(message);
        true
    }

    /// Decodes buffers already in hand and applies the result.
    ///
    /// Convenience for synchronous callers; equivalent to a fetch round
    /// whose response is immediate.
    pub fn load(&mut self, buffers: &[PackageBuffer], limits: &DecodeLimits) {
        let ticket = self.begin_fetch();
        let outcome = decode_all(buffers, limits);
        self.apply_decode(ticket, outcome);
    }

    /// Handles a click on a tree node.
    ///
    /// The node's own kind decides the action: directories toggle their
    /// expansion, files become the selection, unknown paths do nothing.
    pub fn click(&mut self, qualified_path: &str) {
        match self.forest.find(qualified_path) {
            Some(TreeNode::Directory { .. }) => self.toggle_expand(qualified_path),
            Some(TreeNode::File) => self.select_file(qualified_path),
            None => debug!("click on unknown path {}", qualified_path),
        }
    }

    /// Toggles a directory's expansion state. Ignores paths that do not
    /// name a directory.
    pub fn toggle_expand(&mut self, qualified_path: &str) {
        match self.forest.find(qualified_path) {
            Some(node) if node.is_directory() => {
                if !self.expanded.remove(qualified_path) {
                    self.expanded.insert(qualified_path.to_string());
                }
            }
            _ => debug!("toggle on non-directory path {}", qualified_path),
        }
    }

    /// Selects a file. Ignores paths that do not name a file.
    pub fn select_file(&mut self, qualified_path: &str) {
        match self.forest.find(qualified_path) {
            Some(TreeNode::File) => self.selected = Some(qualified_path.to_string()),
            _ => debug!("select on non-file path {}", qualified_path),
        }
    }

    /// Returns what the content pane should currently show.
    pub fn current_content(&self) -> ContentView<'_> {
        let Some(path) = self.selected.as_deref() else {
            return ContentView::NoSelection;
        };
        match self.index.get(path) {
            Some(text) => ContentView::File {
                path,
                text,
                format: DisplayFormat::from_path(path),
            },
            None => ContentView::NoSelection,
        }
    }

    /// Renders the visible tree as a flat row list.
    ///
    /// Package roots appear at depth zero in lexicographic order; an
    /// expanded directory is immediately followed by its children, one
    /// depth deeper, also in lexicographic order.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(String, String, &TreeNode, usize)> = Vec::new();

        let mut package_names: Vec<&str> = self.forest.package_names().collect();
        package_names.reverse();
        for name in package_names {
            if let Some(root) = self.forest.root(name) {
                stack.push((name.to_string(), name.to_string(), root, 0));
            }
        }

        while let Some((path, name, node, depth)) = stack.pop() {
            let expanded = node.is_directory() && self.expanded.contains(&path);
            rows.push(TreeRow {
                name,
                depth,
                is_directory: node.is_directory(),
                expanded,
                child_count: node.child_count(),
                path: path.clone(),
            });
            if !expanded {
                continue;
            }
            if let Some(children) = node.children() {
                for (child_name, child) in children.iter().rev() {
                    stack.push((
                        qualify(&path, child_name),
                        child_name.clone(),
                        child,
                        depth + 1,
                    ));
                }
            }
        }
        rows
    }

    /// Returns the projected forest.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Looks up extracted content by qualified path.
    pub fn content(&self, qualified_path: &str) -> Option<&str> {
        self.index.get(qualified_path)
    }

    /// Returns the qualified path of the selected file, if any.
    pub fn selected_path(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Returns `true` when the directory at the path is expanded.
    pub fn is_expanded(&self, qualified_path: &str) -> bool {
        self.expanded.contains(qualified_path)
    }

    /// Returns the per-package failures of the applied fetch round.
    pub fn decode_failures(&self) -> &[PackageFailure] {
        &self.failures
    }

    /// Returns the transport error of the last fetch round, if it failed
    /// outright.
    pub fn transport_error(&self) -> Option<&str> {
        self.transport_error.as_deref()
    }

    /// Returns the newest fetch generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
