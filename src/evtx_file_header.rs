use crate::err::{EvtxError, Result};
use crate::evtx_parser::ReadSeek;

use bitflags::bitflags;
use byteorder::ReadBytesExt;
use std::io::SeekFrom;

pub const EVTX_FILE_HEADER_SIZE: u64 = 4096;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeaderFlags: u32 {
        const EMPTY = 0x0;
        const DIRTY = 0x1;
        const FULL = 0x2;
    }
}

/// The fixed 4,096-byte structure at the start of every EVTX file.
#[derive(Debug, PartialEq, Eq)]
pub struct EvtxFileHeader {
    pub first_chunk_number: u64,
    pub last_chunk_number: u64,
    pub next_record_id: u64,
    pub header_size: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub header_block_size: u16,
    pub chunk_count: u16,
    pub flags: HeaderFlags,
    /// CRC32 of the first 120 bytes of the header; read but not validated.
    pub checksum: u32,
}

impl EvtxFileHeader {
    pub fn from_stream<T: ReadSeek>(stream: &mut T) -> Result<EvtxFileHeader> {
        let offset = stream.stream_position().unwrap_or_default();
        let mut magic = [0_u8; 8];
        stream
            .read_exact(&mut magic)
            .map_err(|e| EvtxError::from_io(e, offset, "file_header_magic"))?;

        if &magic != b"ElfFile\x00" {
            return Err(EvtxError::InvalidEvtxFileHeaderMagic { magic });
        }

        let first_chunk_number = try_read!(stream, u64, "file_header_first_chunk_number")?;
        let last_chunk_number = try_read!(stream, u64, "file_header_last_chunk_number")?;
        let next_record_id = try_read!(stream, u64, "file_header_next_record_id")?;
        let header_size = try_read!(stream, u32, "file_header_size")?;
        let minor_version = try_read!(stream, u16, "file_header_minor_version")?;
        let major_version = try_read!(stream, u16, "file_header_major_version")?;
        let header_block_size = try_read!(stream, u16, "file_header_block_size")?;
        let chunk_count = try_read!(stream, u16, "file_header_chunk_count")?;

        if major_version != 3 || minor_version != 1 {
            return Err(EvtxError::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        // Reserved.
        stream.seek(SeekFrom::Current(76))?;

        let raw_flags = try_read!(stream, u32, "file_header_flags")?;
        let flags = HeaderFlags::from_bits_truncate(raw_flags);
        let checksum = try_read!(stream, u32, "file_header_checksum")?;

        // The remainder of the 4,096-byte block is unused.
        stream.seek(SeekFrom::Current(4096 - 128))?;

        Ok(EvtxFileHeader {
            first_chunk_number,
            last_chunk_number,
            next_record_id,
            header_size,
            minor_version,
            major_version,
            header_block_size,
            chunk_count,
            flags,
            checksum,
        })
    }
}
