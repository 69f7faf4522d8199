//! Async fetch-and-refresh driving for an [`Explorer`].
//!
//! [`refresh`] runs one full fetch round: pull an envelope document from an
//! [`EnvelopeSource`], parse it, decode every package buffer on the
//! blocking thread pool, and apply the result. The round's
//! [`FetchTicket`](crate::FetchTicket) travels through unchanged, so a
//! round that was overtaken by a newer one resolves to
//! [`RefreshOutcome::Superseded`] instead of clobbering newer state.
//!
//! # Example
//!
//! ```rust,ignore
//! use paktree::{DecodeLimits, Explorer};
//! use paktree::async_fetch::{EnvelopeSource, RefreshOutcome, refresh};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut explorer = Explorer::new();
//!     let source = MyHttpSource::new("https://packages.example/batch");
//!     match refresh(&mut explorer, &source, &DecodeLimits::default()).await {
//!         RefreshOutcome::Applied => println!("{} rows", explorer.visible_rows().len()),
//!         RefreshOutcome::TransportFailed => eprintln!("fetch failed"),
//!         RefreshOutcome::Superseded => {}
//!     }
//! }
//! ```

use std::future::Future;

use futures::future;

use crate::decode::{DecodeLimits, DecodeOutcome, PackageBuffer, decode_package};
use crate::envelope::parse_envelope;
use crate::explorer::Explorer;
use crate::{Error, Result};

/// Something that can produce envelope documents, typically an HTTP client.
pub trait EnvelopeSource {
    /// Fetches one envelope document.
    ///
    /// # Errors
    ///
    /// Any error here is treated as a transport failure for the round.
    fn fetch(&self) -> impl Future<Output = Result<String>> + Send;
}

/// How a refresh round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The round's packages were decoded and applied.
    Applied,
    /// The envelope could not be fetched or parsed; the transport error
    /// was recorded and the tree cleared.
    TransportFailed,
    /// A newer round started while this one was in flight; its result was
    /// dropped.
    Superseded,
}

/// Runs one fetch round against the explorer.
///
/// Decode failures of individual packages do not fail the round; they land
/// in [`Explorer::decode_failures`] while the healthy packages display
/// normally.
pub async fn refresh<S: EnvelopeSource>(
    explorer: &mut Explorer,
    source: &S,
    limits: &DecodeLimits,
) -> RefreshOutcome {
    let ticket = explorer.begin_fetch();

    let envelope = match source.fetch().await {
        Ok(envelope) => envelope,
        Err(error) => {
            return if explorer.fail_fetch(ticket, error.to_string()) {
                RefreshOutcome::TransportFailed
            } else {
                RefreshOutcome::Superseded
            };
        }
    };

    let buffers = match parse_envelope(&envelope) {
        Ok(buffers) => buffers,
        Err(error) => {
            return if explorer.fail_fetch(ticket, error.to_string()) {
                RefreshOutcome::TransportFailed
            } else {
                RefreshOutcome::Superseded
            };
        }
    };

    let outcome = decode_buffers(buffers, limits.clone()).await;
    if explorer.apply_decode(ticket, outcome) {
        RefreshOutcome::Applied
    } else {
        RefreshOutcome::Superseded
    }
}

/// Decodes buffers concurrently on the blocking thread pool.
async fn decode_buffers(buffers: Vec<PackageBuffer>, limits: DecodeLimits) -> DecodeOutcome {
    let mut names = Vec::with_capacity(buffers.len());
    let mut handles = Vec::with_capacity(buffers.len());
    for buffer in buffers {
        names.push(buffer.package_name.clone());
        let limits = limits.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            decode_package(&buffer.package_name, &buffer.bytes, &limits)
        }));
    }

    let joined = future::join_all(handles).await;
    let results = names
        .into_iter()
        .zip(joined)
        .map(|(name, joined)| {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(Error::Io(std::io::Error::other(e))),
            };
            (name, result)
        })
        .collect();
    DecodeOutcome::from_results(results)
}
