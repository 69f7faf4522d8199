//! Minimal ZIP reader for in-memory package buffers.
//!
//! [`ZipArchive`] parses the central directory of a buffer and extracts
//! individual entries on demand. It supports the subset of the format that
//! package uploads actually use: single-volume archives with stored or
//! deflated entries. ZIP64, multi-disk, and encrypted archives are rejected
//! with descriptive errors.
//!
//! The central directory is authoritative for entry metadata; local file
//! headers are consulted only to find where each entry's data begins.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use paktree::zip::ZipArchive;
//!
//! # fn run(buffer: Vec<u8>) -> paktree::Result<()> {
//! let mut archive = ZipArchive::open(Cursor::new(buffer))?;
//! for index in 0..archive.len() {
//!     let entry = &archive.entries()[index];
//!     println!("{} ({} bytes)", entry.name, entry.uncompressed_size);
//! }
//! let first = archive.read_to_vec(0)?;
//! # let _ = first;
//! # Ok(())
//! # }
//! ```

pub mod records;

use std::io::{Read, Seek, SeekFrom};

use crate::{Error, Result};

use records::{
    CentralDirectoryRecord, LocalFileHeader, METHOD_STORED, locate_end_of_central_directory,
};

#[cfg(feature = "deflate")]
use records::METHOD_DEFLATE;

/// Metadata for one archive entry, taken from the central directory.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ZipEntry {
    /// Entry name as stored in the archive. Non-UTF-8 bytes are replaced.
    pub name: String,
    /// Whether the entry is a directory (trailing `/` or MS-DOS directory
    /// attribute).
    pub is_directory: bool,
    /// Compression method ID.
    pub method: u16,
    /// General purpose bit flags.
    pub flags: u16,
    /// Expected CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// Uncompressed size in bytes, as declared by the central directory.
    pub uncompressed_size: u64,
    local_header_offset: u64,
}

impl ZipEntry {
    fn from_record(record: CentralDirectoryRecord) -> Self {
        let is_directory = record.is_directory();
        Self {
            is_directory,
            method: record.method,
            flags: record.flags,
            crc32: record.crc32,
            compressed_size: record.compressed_size as u64,
            uncompressed_size: record.uncompressed_size as u64,
            local_header_offset: record.local_header_offset as u64,
            name: record.name,
        }
    }
}

/// A ZIP archive opened over a seekable reader.
///
/// Opening parses the full central directory up front; entry data is read
/// lazily through [`read_to_vec`](Self::read_to_vec).
pub struct ZipArchive<R> {
    reader: R,
    entries: Vec<ZipEntry>,
    archive_len: u64,
}

impl<R: Read + Seek> ZipArchive<R> {
    /// Opens an archive, locating and parsing its central directory.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] when the buffer is not a ZIP archive or
    ///   uses an unsupported variant (ZIP64, multi-disk)
    /// - [`Error::CorruptRecord`] when a record fails its signature or
    ///   bounds checks
    /// - [`Error::Io`] when the buffer is truncated mid-record
    pub fn open(mut reader: R) -> Result<Self> {
        let (eocd_offset, eocd) = locate_end_of_central_directory(&mut reader)?;
        eocd.check_supported()?;

        let cd_offset = eocd.central_dir_offset as u64;
        let cd_size = eocd.central_dir_size as u64;
        if cd_offset + cd_size > eocd_offset {
            return Err(Error::corrupt_record(
                eocd_offset,
                format!(
                    "central directory ({} bytes at {:#x}) extends past its end marker",
                    cd_size, cd_offset
                ),
            ));
        }

        let archive_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(cd_offset))?;
        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        let mut record_offset = cd_offset;
        for _ in 0..eocd.total_entries {
            let record = CentralDirectoryRecord::parse(&mut reader, record_offset)?;
            entries.push(ZipEntry::from_record(record));
            record_offset = reader.stream_position()?;
        }

        Ok(Self {
            reader,
            entries,
            archive_len,
        })
    }

    /// Returns the entries listed in the central directory, in archive order.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extracts one entry's uncompressed bytes.
    ///
    /// Directory entries yield an empty buffer. The returned buffer is
    /// bounded by the entry's declared uncompressed size; callers holding a
    /// stricter policy should check [`ZipEntry::uncompressed_size`] before
    /// extracting.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedMethod`] for compression methods other than
    ///   stored and deflate
    /// - [`Error::CorruptRecord`] when sizes are inconsistent or the local
    ///   header is damaged
    /// - [`Error::CrcMismatch`] when the extracted bytes fail verification
    pub fn read_to_vec(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(index)
            .ok_or_else(|| {
                Error::invalid_format(format!(
                    "entry index {} out of range ({} entries)",
                    index,
                    self.entries.len()
                ))
            })?
            .clone();

        if entry.is_directory {
            return Ok(Vec::new());
        }
        if entry.compressed_size > self.archive_len {
            return Err(Error::corrupt_record(
                entry.local_header_offset,
                format!(
                    "compressed size {} exceeds archive size {}",
                    entry.compressed_size, self.archive_len
                ),
            ));
        }

        self.reader.seek(SeekFrom::Start(entry.local_header_offset))?;
        let local = LocalFileHeader::parse(&mut self.reader, entry.local_header_offset)?;
        let data_offset = local.data_offset(entry.local_header_offset);
        if data_offset + entry.compressed_size > self.archive_len {
            return Err(Error::corrupt_record(
                data_offset,
                "entry data extends past end of archive",
            ));
        }

        self.reader.seek(SeekFrom::Start(data_offset))?;
        let compressed = records::read_bytes(&mut self.reader, entry.compressed_size as usize)?;

        let data = match entry.method {
            METHOD_STORED => {
                if entry.compressed_size != entry.uncompressed_size {
                    return Err(Error::corrupt_record(
                        data_offset,
                        format!(
                            "stored entry declares compressed size {} but uncompressed size {}",
                            entry.compressed_size, entry.uncompressed_size
                        ),
                    ));
                }
                compressed
            }
            #[cfg(feature = "deflate")]
            METHOD_DEFLATE => inflate(&compressed, entry.uncompressed_size, data_offset)?,
            other => return Err(Error::UnsupportedMethod { method_id: other }),
        };

        let actual = crc32fast::hash(&data);
        if actual != entry.crc32 {
            return Err(Error::crc_mismatch(entry.name, entry.crc32, actual));
        }

        Ok(data)
    }
}

impl<R> std::fmt::Debug for ZipArchive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("entries", &self.entries.len())
            .field("archive_len", &self.archive_len)
            .finish()
    }
}

/// Inflates a raw deflate stream, verifying the declared output size.
#[cfg(feature = "deflate")]
fn inflate(compressed: &[u8], declared_size: u64, data_offset: u64) -> Result<Vec<u8>> {
    let decoder = flate2::bufread::DeflateDecoder::new(compressed);
    let mut out = Vec::new();
    // Cap at declared size + 1 so an overlong stream is detected without
    // inflating it in full.
    decoder.take(declared_size + 1).read_to_end(&mut out)?;
    if out.len() as u64 != declared_size {
        return Err(Error::corrupt_record(
            data_offset,
            format!(
                "inflated to {} bytes but central directory declares {}",
                out.len(),
                declared_size
            ),
        ));
    }
    Ok(out)
}
