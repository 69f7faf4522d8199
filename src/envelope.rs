//! Transport envelope for batched package downloads.
//!
//! Package buffers arrive as one JSON document:
//!
//! ```json
//! [
//!   { "packageName": "alpha", "buffer": { "type": "Buffer", "data": [80, 75, 5, 6] } }
//! ]
//! ```
//!
//! `data` is the archive's raw bytes as a JSON number array. Downloads whose
//! buffer carries a tag other than `"Buffer"` are skipped; a document that
//! does not match the shape at all is a transport failure and maps to
//! [`Error::Envelope`](crate::Error::Envelope).

use log::debug;
use serde::Deserialize;

use crate::Result;
use crate::decode::PackageBuffer;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageDownload {
    package_name: String,
    buffer: RawBuffer,
}

#[derive(Debug, Deserialize)]
struct RawBuffer {
    #[serde(rename = "type")]
    tag: String,
    data: Vec<u8>,
}

/// Parses an envelope document into named package buffers.
///
/// Downloads with an unrecognized buffer tag are dropped with a log line;
/// the rest of the envelope still parses.
///
/// # Errors
///
/// Returns [`Error::Envelope`](crate::Error::Envelope) when the document is
/// not valid JSON or does not match the envelope shape.
pub fn parse_envelope(json: &str) -> Result<Vec<PackageBuffer>> {
    let downloads: Vec<PackageDownload> = serde_json::from_str(json)?;
    let mut buffers = Vec::with_capacity(downloads.len());
    for download in downloads {
        if download.buffer.tag != "Buffer" {
            debug!(
                "ignoring download for {} with buffer tag {:?}",
                download.package_name, download.buffer.tag
            );
            continue;
        }
        buffers.push(PackageBuffer::new(
            download.package_name,
            download.buffer.data,
        ));
    }
    Ok(buffers)
}
