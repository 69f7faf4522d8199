//! # paktree
//!
//! Decode batches of named ZIP package buffers and explore their contents
//! as per-package directory trees.
//!
//! This crate takes the raw archive buffers a package registry hands out,
//! decodes them with per-package failure isolation, projects each package's
//! flat entry paths into a directory tree, indexes every readable file's
//! text content, and drives the expand/collapse/select state a tree browser
//! needs on top.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paktree::{ContentView, DecodeLimits, Explorer, PackageBuffer};
//!
//! fn main() -> paktree::Result<()> {
//!     let buffers = vec![
//!         PackageBuffer::new("alpha", std::fs::read("alpha.zip")?),
//!         PackageBuffer::new("beta", std::fs::read("beta.zip")?),
//!     ];
//!
//!     let mut explorer = Explorer::new();
//!     explorer.load(&buffers, &DecodeLimits::default());
//!
//!     // Packages render as collapsed roots; clicks drill in.
//!     explorer.click("alpha");
//!     for row in explorer.visible_rows() {
//!         println!("{}{}", "  ".repeat(row.depth), row.name);
//!     }
//!
//!     explorer.click("alpha/readme.md");
//!     if let ContentView::File { text, .. } = explorer.current_content() {
//!         println!("{}", text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Decoding Without the Explorer
//!
//! The decoding and projection layers work standalone:
//!
//! ```rust,no_run
//! use paktree::{DecodeLimits, Forest, PackageBuffer, decode_all};
//!
//! # fn run(buffers: Vec<PackageBuffer>) {
//! let outcome = decode_all(&buffers, &DecodeLimits::default());
//! for failure in &outcome.failures {
//!     eprintln!("{}", failure);
//! }
//! let forest = Forest::project(&outcome.packages);
//! println!("{} packages decoded", forest.len());
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `deflate` | Yes | Deflate decompression for compressed entries |
//! | `async` | No | Async fetch driving with Tokio integration |
//!
//! Without `deflate`, archives still open but deflated entries degrade to
//! unreadable; only stored entries yield content.
//!
//! ## Async API
//!
//! Enable the `async` feature to drive fetch rounds from an async source:
//!
//! ```rust,ignore
//! # #[cfg(feature = "async")]
//! use paktree::{DecodeLimits, Explorer};
//! # #[cfg(feature = "async")]
//! use paktree::async_fetch::refresh;
//!
//! # #[cfg(feature = "async")]
//! #[tokio::main]
//! async fn main() {
//!     let mut explorer = Explorer::new();
//!     let source = my_registry_client();
//!     refresh(&mut explorer, &source, &DecodeLimits::default()).await;
//! }
//! # #[cfg(not(feature = "async"))]
//! # fn main() {}
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Failure is layered: a damaged buffer
//! fails only its own package, a damaged entry degrades to an unreadable
//! file inside an otherwise healthy package, and only a failed fetch of
//! the whole envelope clears the tree.
//!
//! ```rust,no_run
//! use paktree::{DecodeLimits, Error, decode_package};
//!
//! fn inspect(name: &str, bytes: &[u8]) {
//!     match decode_package(name, bytes, &DecodeLimits::default()) {
//!         Ok(entries) => println!("{}: {} entries", name, entries.len()),
//!         Err(Error::InvalidFormat(msg)) => eprintln!("{}: not an archive: {}", name, msg),
//!         Err(Error::ResourceLimitExceeded(msg)) => eprintln!("{}: too large: {}", name, msg),
//!         Err(e) => eprintln!("{}: {}", name, e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Safety and Resource Limits
//!
//! Buffers are untrusted input. [`DecodeLimits`] guards entry counts and
//! uncompressed sizes, inflation stops at the declared output size, and
//! every extracted entry is CRC-verified.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod decode;
pub mod entry_path;
pub mod envelope;
pub mod error;
pub mod explorer;
pub mod index;
pub mod tree;
pub mod zip;

// Async module (requires "async" feature)
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub mod async_fetch;

pub use entry_path::EntryPath;
pub use error::{Error, Result};

// Re-export the decoding API at crate root for convenience
pub use decode::{
    ArchiveEntry, DecodeLimits, DecodeOutcome, PackageBuffer, PackageFailure, decode_all,
    decode_package,
};

// Re-export the envelope API
pub use envelope::parse_envelope;

// Re-export the projection API
pub use index::ContentIndex;
pub use tree::{Forest, TreeNode};

// Re-export the exploration API
pub use explorer::{ContentView, DisplayFormat, Explorer, FetchTicket, TreeRow};

#[cfg(feature = "async")]
pub use async_fetch::{EnvelopeSource, RefreshOutcome, refresh};
