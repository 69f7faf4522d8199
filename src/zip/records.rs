//! Binary record definitions for the ZIP container format.
//!
//! This module contains the little-endian field readers and the three record
//! types the reader needs: the end-of-central-directory record, central
//! directory file headers, and local file headers. Parsing is strict about
//! signatures and reports corruption with the byte offset where it was
//! detected.
//!
//! Record layouts follow the PKWARE APPNOTE. Only the fields the reader
//! consumes are retained; the rest are read and discarded.

use std::io::{self, Read, Seek, SeekFrom};

use crate::{Error, Result};

/// Signature of the end-of-central-directory record (`PK\x05\x06`).
pub const EOCD_SIGNATURE: u32 = 0x0605_4b50;

/// Signature of a central directory file header (`PK\x01\x02`).
pub const CENTRAL_DIR_SIGNATURE: u32 = 0x0201_4b50;

/// Signature of a local file header (`PK\x03\x04`).
pub const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

/// Size of the fixed portion of the end-of-central-directory record,
/// including its signature.
pub const EOCD_SIZE: usize = 22;

/// Size of the fixed portion of a local file header, including its signature.
pub const LOCAL_HEADER_SIZE: usize = 30;

/// Maximum length of the archive comment that can follow the
/// end-of-central-directory record.
pub const MAX_COMMENT_LENGTH: usize = 65535;

/// Compression method: stored (no compression).
pub const METHOD_STORED: u16 = 0;

/// Compression method: deflate.
pub const METHOD_DEFLATE: u16 = 8;

/// MS-DOS directory bit in the external attributes field.
pub const DOS_DIRECTORY_ATTRIBUTE: u32 = 0x10;

/// Marker value signalling ZIP64 in 16-bit count fields.
const ZIP64_U16_MARKER: u16 = 0xFFFF;

/// Marker value signalling ZIP64 in 32-bit size/offset fields.
const ZIP64_U32_MARKER: u32 = 0xFFFF_FFFF;

/// Reads a little-endian u16 from the reader.
pub fn read_u16_le<R: Read>(reader: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Reads a little-endian u32 from the reader.
pub fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Reads exactly `count` bytes from the reader.
pub fn read_bytes<R: Read>(reader: &mut R, count: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; count];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// The end-of-central-directory record.
///
/// Located at the very end of the archive (possibly followed by a comment),
/// it points at the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Number of this disk.
    pub disk_number: u16,
    /// Disk where the central directory starts.
    pub central_dir_disk: u16,
    /// Central directory entries on this disk.
    pub entries_on_disk: u16,
    /// Total central directory entries.
    pub total_entries: u16,
    /// Size of the central directory in bytes.
    pub central_dir_size: u32,
    /// Offset of the central directory from the start of the archive.
    pub central_dir_offset: u32,
    /// Length of the trailing archive comment.
    pub comment_length: u16,
}

impl EndOfCentralDirectory {
    /// Parses the record fields. The reader must be positioned just past the
    /// signature.
    pub fn parse<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            disk_number: read_u16_le(reader)?,
            central_dir_disk: read_u16_le(reader)?,
            entries_on_disk: read_u16_le(reader)?,
            total_entries: read_u16_le(reader)?,
            central_dir_size: read_u32_le(reader)?,
            central_dir_offset: read_u32_le(reader)?,
            comment_length: read_u16_le(reader)?,
        })
    }

    /// Returns an error if the record describes a multi-disk or ZIP64
    /// archive, neither of which this reader supports.
    pub fn check_supported(&self) -> Result<()> {
        if self.disk_number != 0 || self.central_dir_disk != 0 {
            return Err(Error::invalid_format(
                "multi-disk archives are not supported",
            ));
        }
        if self.entries_on_disk != self.total_entries {
            return Err(Error::invalid_format(
                "central directory is split across disks",
            ));
        }
        if self.total_entries == ZIP64_U16_MARKER
            || self.central_dir_size == ZIP64_U32_MARKER
            || self.central_dir_offset == ZIP64_U32_MARKER
        {
            return Err(Error::invalid_format("ZIP64 archives are not supported"));
        }
        Ok(())
    }
}

/// Locates and parses the end-of-central-directory record.
///
/// Scans backward from the end of the reader over at most
/// [`EOCD_SIZE`] + [`MAX_COMMENT_LENGTH`] bytes. A signature match is only
/// accepted when the record's comment length places its end exactly at the
/// end of the buffer, which rejects signature bytes that happen to appear
/// inside the comment itself.
///
/// Returns the absolute offset of the record and the parsed record.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] when no record is found, which is the
/// "this is not a ZIP archive" signal.
pub fn locate_end_of_central_directory<R: Read + Seek>(
    reader: &mut R,
) -> Result<(u64, EndOfCentralDirectory)> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    if (file_len as usize) < EOCD_SIZE {
        return Err(Error::invalid_format(format!(
            "buffer of {} bytes is too small to be an archive",
            file_len
        )));
    }

    let window = (EOCD_SIZE + MAX_COMMENT_LENGTH).min(file_len as usize);
    let window_start = file_len - window as u64;
    reader.seek(SeekFrom::Start(window_start))?;
    let tail = read_bytes(reader, window)?;

    let signature = EOCD_SIGNATURE.to_le_bytes();
    let mut pos = window - EOCD_SIZE;
    loop {
        if tail[pos..pos + 4] == signature {
            let mut fields = &tail[pos + 4..];
            let record = EndOfCentralDirectory::parse(&mut fields)?;
            if pos + EOCD_SIZE + record.comment_length as usize == window {
                return Ok((window_start + pos as u64, record));
            }
        }
        if pos == 0 {
            break;
        }
        pos -= 1;
    }

    Err(Error::invalid_format(
        "end of central directory record not found",
    ))
}

/// A central directory file header.
///
/// One per archive entry; the authoritative source for sizes, CRC, and the
/// local header offset (local headers may carry zeroed values when the
/// data-descriptor flag, bit 3, is set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryRecord {
    /// General purpose bit flags.
    pub flags: u16,
    /// Compression method.
    pub method: u16,
    /// CRC-32 of the uncompressed entry data.
    pub crc32: u32,
    /// Compressed size in bytes.
    pub compressed_size: u32,
    /// Uncompressed size in bytes.
    pub uncompressed_size: u32,
    /// External attributes; host-dependent, MS-DOS bits in the low byte.
    pub external_attributes: u32,
    /// Offset of the entry's local file header.
    pub local_header_offset: u32,
    /// Entry name. Non-UTF-8 bytes are replaced.
    pub name: String,
}

impl CentralDirectoryRecord {
    /// Parses one record, including its signature.
    ///
    /// `record_offset` is the absolute offset of the record, used in
    /// corruption errors. The reader is left positioned at the next record.
    pub fn parse<R: Read>(reader: &mut R, record_offset: u64) -> Result<Self> {
        let signature = read_u32_le(reader)?;
        if signature != CENTRAL_DIR_SIGNATURE {
            return Err(Error::corrupt_record(
                record_offset,
                format!(
                    "expected central directory signature {:#010x}, found {:#010x}",
                    CENTRAL_DIR_SIGNATURE, signature
                ),
            ));
        }

        let _version_made_by = read_u16_le(reader)?;
        let _version_needed = read_u16_le(reader)?;
        let flags = read_u16_le(reader)?;
        let method = read_u16_le(reader)?;
        let _mod_time = read_u16_le(reader)?;
        let _mod_date = read_u16_le(reader)?;
        let crc32 = read_u32_le(reader)?;
        let compressed_size = read_u32_le(reader)?;
        let uncompressed_size = read_u32_le(reader)?;
        let name_length = read_u16_le(reader)?;
        let extra_length = read_u16_le(reader)?;
        let comment_length = read_u16_le(reader)?;
        let _disk_number_start = read_u16_le(reader)?;
        let _internal_attributes = read_u16_le(reader)?;
        let external_attributes = read_u32_le(reader)?;
        let local_header_offset = read_u32_le(reader)?;

        if compressed_size == ZIP64_U32_MARKER
            || uncompressed_size == ZIP64_U32_MARKER
            || local_header_offset == ZIP64_U32_MARKER
        {
            return Err(Error::invalid_format("ZIP64 archives are not supported"));
        }

        let name_bytes = read_bytes(reader, name_length as usize)?;
        let name = String::from_utf8_lossy(&name_bytes).into_owned();
        let _ = read_bytes(reader, extra_length as usize + comment_length as usize)?;

        Ok(Self {
            flags,
            method,
            crc32,
            compressed_size,
            uncompressed_size,
            external_attributes,
            local_header_offset,
            name,
        })
    }

    /// Returns `true` if the record describes a directory entry.
    ///
    /// A trailing separator or the MS-DOS directory attribute both mark a
    /// directory; either alone is sufficient.
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/') || self.external_attributes & DOS_DIRECTORY_ATTRIBUTE != 0
    }
}

/// A local file header.
///
/// Parsed only to find where the entry's data starts; the central directory
/// values are authoritative for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    /// General purpose bit flags.
    pub flags: u16,
    /// Compression method.
    pub method: u16,
    /// Entry name length.
    pub name_length: u16,
    /// Extra field length. May differ from the central directory's.
    pub extra_length: u16,
}

impl LocalFileHeader {
    /// Parses one header, including its signature.
    ///
    /// `header_offset` is the absolute offset of the header, used in
    /// corruption errors.
    pub fn parse<R: Read>(reader: &mut R, header_offset: u64) -> Result<Self> {
        let signature = read_u32_le(reader)?;
        if signature != LOCAL_HEADER_SIGNATURE {
            return Err(Error::corrupt_record(
                header_offset,
                format!(
                    "expected local file header signature {:#010x}, found {:#010x}",
                    LOCAL_HEADER_SIGNATURE, signature
                ),
            ));
        }

        let _version_needed = read_u16_le(reader)?;
        let flags = read_u16_le(reader)?;
        let method = read_u16_le(reader)?;
        let _mod_time = read_u16_le(reader)?;
        let _mod_date = read_u16_le(reader)?;
        let _crc32 = read_u32_le(reader)?;
        let _compressed_size = read_u32_le(reader)?;
        let _uncompressed_size = read_u32_le(reader)?;
        let name_length = read_u16_le(reader)?;
        let extra_length = read_u16_le(reader)?;

        Ok(Self {
            flags,
            method,
            name_length,
            extra_length,
        })
    }

    /// Returns the offset of the entry data for a header at `header_offset`.
    pub fn data_offset(&self, header_offset: u64) -> u64 {
        header_offset + LOCAL_HEADER_SIZE as u64 + self.name_length as u64 + self.extra_length as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn eocd_bytes(total_entries: u16, cd_size: u32, cd_offset: u32, comment: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&EOCD_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number
        out.extend_from_slice(&0u16.to_le_bytes()); // central dir disk
        out.extend_from_slice(&total_entries.to_le_bytes());
        out.extend_from_slice(&total_entries.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        out.extend_from_slice(comment);
        out
    }

    #[test]
    fn test_read_u16_le() {
        let mut cursor = Cursor::new([0x34, 0x12]);
        assert_eq!(read_u16_le(&mut cursor).unwrap(), 0x1234);
    }

    #[test]
    fn test_read_u32_le() {
        let mut cursor = Cursor::new([0x78, 0x56, 0x34, 0x12]);
        assert_eq!(read_u32_le(&mut cursor).unwrap(), 0x12345678);
    }

    #[test]
    fn test_read_u32_le_truncated() {
        let mut cursor = Cursor::new([0x78, 0x56]);
        assert!(read_u32_le(&mut cursor).is_err());
    }

    #[test]
    fn test_locate_eocd_no_comment() {
        let bytes = eocd_bytes(3, 100, 200, b"");
        let mut cursor = Cursor::new(&bytes);
        let (offset, record) = locate_end_of_central_directory(&mut cursor).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(record.total_entries, 3);
        assert_eq!(record.central_dir_size, 100);
        assert_eq!(record.central_dir_offset, 200);
    }

    #[test]
    fn test_locate_eocd_with_comment() {
        let mut bytes = vec![0u8; 10]; // leading data before the record
        bytes.extend_from_slice(&eocd_bytes(1, 46, 30, b"package archive"));
        let mut cursor = Cursor::new(&bytes);
        let (offset, record) = locate_end_of_central_directory(&mut cursor).unwrap();
        assert_eq!(offset, 10);
        assert_eq!(record.comment_length as usize, "package archive".len());
    }

    #[test]
    fn test_locate_eocd_ignores_signature_in_comment() {
        // A comment containing the signature bytes must not shadow the real
        // record; the comment-length consistency check rejects it.
        let mut comment = Vec::new();
        comment.extend_from_slice(&EOCD_SIGNATURE.to_le_bytes());
        comment.extend_from_slice(&[0xFF; 18]);
        let bytes = eocd_bytes(2, 92, 40, &comment);
        let mut cursor = Cursor::new(&bytes);
        let (offset, record) = locate_end_of_central_directory(&mut cursor).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(record.total_entries, 2);
    }

    #[test]
    fn test_locate_eocd_missing() {
        let bytes = vec![0xAB; 64];
        let mut cursor = Cursor::new(&bytes);
        let err = locate_end_of_central_directory(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_locate_eocd_too_small() {
        let mut cursor = Cursor::new(b"PK");
        let err = locate_end_of_central_directory(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_check_supported_multi_disk() {
        let mut record = EndOfCentralDirectory::parse(&mut Cursor::new([0u8; 18])).unwrap();
        record.disk_number = 1;
        assert!(matches!(
            record.check_supported(),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_check_supported_zip64_markers() {
        let mut record = EndOfCentralDirectory::parse(&mut Cursor::new([0u8; 18])).unwrap();
        record.total_entries = 0xFFFF;
        record.entries_on_disk = 0xFFFF;
        assert!(matches!(
            record.check_supported(),
            Err(Error::InvalidFormat(_))
        ));
    }

    fn central_record_bytes(name: &[u8], method: u16, external_attributes: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&CENTRAL_DIR_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes()); // version made by
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0u16.to_le_bytes()); // flags
        out.extend_from_slice(&method.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // mod time
        out.extend_from_slice(&0u16.to_le_bytes()); // mod date
        out.extend_from_slice(&0xCAFEBABEu32.to_le_bytes()); // crc
        out.extend_from_slice(&5u32.to_le_bytes()); // compressed
        out.extend_from_slice(&5u32.to_le_bytes()); // uncompressed
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra
        out.extend_from_slice(&0u16.to_le_bytes()); // comment
        out.extend_from_slice(&0u16.to_le_bytes()); // disk start
        out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        out.extend_from_slice(&external_attributes.to_le_bytes());
        out.extend_from_slice(&64u32.to_le_bytes()); // local header offset
        out.extend_from_slice(name);
        out
    }

    #[test]
    fn test_central_record_parse() {
        let bytes = central_record_bytes(b"src/main.dart", METHOD_DEFLATE, 0);
        let record = CentralDirectoryRecord::parse(&mut Cursor::new(&bytes), 0).unwrap();
        assert_eq!(record.name, "src/main.dart");
        assert_eq!(record.method, METHOD_DEFLATE);
        assert_eq!(record.crc32, 0xCAFEBABE);
        assert_eq!(record.local_header_offset, 64);
        assert!(!record.is_directory());
    }

    #[test]
    fn test_central_record_bad_signature() {
        let mut bytes = central_record_bytes(b"a.txt", METHOD_STORED, 0);
        bytes[0] = 0x00;
        let err = CentralDirectoryRecord::parse(&mut Cursor::new(&bytes), 0x30).unwrap_err();
        match err {
            Error::CorruptRecord { offset, .. } => assert_eq!(offset, 0x30),
            other => panic!("expected CorruptRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_central_record_directory_by_trailing_slash() {
        let bytes = central_record_bytes(b"lib/", METHOD_STORED, 0);
        let record = CentralDirectoryRecord::parse(&mut Cursor::new(&bytes), 0).unwrap();
        assert!(record.is_directory());
    }

    #[test]
    fn test_central_record_directory_by_attribute() {
        let bytes = central_record_bytes(b"com.example", METHOD_STORED, DOS_DIRECTORY_ATTRIBUTE);
        let record = CentralDirectoryRecord::parse(&mut Cursor::new(&bytes), 0).unwrap();
        assert!(record.is_directory());
    }

    #[test]
    fn test_central_record_non_utf8_name_is_lossy() {
        let bytes = central_record_bytes(&[0x66, 0xFF, 0x6F], METHOD_STORED, 0);
        let record = CentralDirectoryRecord::parse(&mut Cursor::new(&bytes), 0).unwrap();
        assert_eq!(record.name, "f\u{FFFD}o");
    }

    #[test]
    fn test_local_header_parse_and_data_offset() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&LOCAL_HEADER_SIGNATURE.to_le_bytes());
        bytes.extend_from_slice(&20u16.to_le_bytes()); // version needed
        bytes.extend_from_slice(&0u16.to_le_bytes()); // flags
        bytes.extend_from_slice(&METHOD_STORED.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // time + date
        bytes.extend_from_slice(&0u32.to_le_bytes()); // crc
        bytes.extend_from_slice(&3u32.to_le_bytes()); // compressed
        bytes.extend_from_slice(&3u32.to_le_bytes()); // uncompressed
        bytes.extend_from_slice(&5u16.to_le_bytes()); // name length
        bytes.extend_from_slice(&4u16.to_le_bytes()); // extra length
        let header = LocalFileHeader::parse(&mut Cursor::new(&bytes), 0x100).unwrap();
        assert_eq!(header.name_length, 5);
        assert_eq!(header.extra_length, 4);
        assert_eq!(header.data_offset(0x100), 0x100 + 30 + 5 + 4);
    }

    #[test]
    fn test_local_header_bad_signature() {
        let bytes = [0u8; LOCAL_HEADER_SIZE];
        let err = LocalFileHeader::parse(&mut Cursor::new(&bytes), 7).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { offset: 7, .. }));
    }
}
