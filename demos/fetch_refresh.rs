//! Drive a fetch round from an async envelope source.
//!
//! This example demonstrates the async API:
//! - Implementing [`EnvelopeSource`] for a custom transport
//! - Running a refresh round against an explorer
//! - Handling the three refresh outcomes
//!
//! The source here reads the envelope JSON from a local file; a real
//! application would put an HTTP client behind the same trait.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example fetch_refresh --features async -- envelope.json
//! ```
//!
//! # Note
//!
//! This example requires the `async` feature to be enabled.

#[cfg(feature = "async")]
use paktree::async_fetch::{EnvelopeSource, RefreshOutcome, refresh};

#[cfg(feature = "async")]
use paktree::{DecodeLimits, Explorer, Result};

#[cfg(feature = "async")]
use std::env;

#[cfg(feature = "async")]
struct FileSource {
    path: String,
}

#[cfg(feature = "async")]
impl EnvelopeSource for FileSource {
    async fn fetch(&self) -> Result<String> {
        // Stands in for a network round trip
        Ok(std::fs::read_to_string(&self.path)?)
    }
}

#[cfg(feature = "async")]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <envelope.json>", args[0]);
        eprintln!();
        eprintln!("Fetches an envelope document and applies it to an explorer.");
        eprintln!("The document is a JSON array of packageName/buffer objects.");
        std::process::exit(1);
    }

    let source = FileSource {
        path: args[1].clone(),
    };
    let mut explorer = Explorer::new();

    match refresh(&mut explorer, &source, &DecodeLimits::default()).await {
        RefreshOutcome::Applied => {
            println!("Applied fetch round {}", explorer.generation());
            for failure in explorer.decode_failures() {
                eprintln!("warning: {}", failure);
            }
            for row in explorer.visible_rows() {
                println!("  {} ({} entries)", row.name, row.child_count);
            }
        }
        RefreshOutcome::TransportFailed => {
            eprintln!(
                "fetch failed: {}",
                explorer.transport_error().unwrap_or("unknown error")
            );
            std::process::exit(1);
        }
        RefreshOutcome::Superseded => {
            // Unreachable with a single round; kept for completeness
            eprintln!("round was superseded");
        }
    }
}

#[cfg(not(feature = "async"))]
fn main() {
    eprintln!("This example requires the 'async' feature.");
    eprintln!("Run with: cargo run --example fetch_refresh --features async -- <envelope.json>");
    std::process::exit(1);
}
