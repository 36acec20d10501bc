use crate::binxml::interpreter::BinXmlInterpreter;
use crate::err::{EvtxError, Result};
use crate::evtx_record::{EvtxRecordHeader, RecordId, EVTX_RECORD_HEADER_SIZE};
use crate::utils::datetime_from_filetime;

use byteorder::ReadBytesExt;
use chrono::{DateTime, Utc};
use log::{debug, trace};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

pub const EVTX_CHUNK_SIZE: usize = 65536;
pub(crate) const EVTX_CHUNK_HEADER_SIZE: u64 = 512;

/// Fixed-size header at the start of every chunk. Only the fields this
/// parser consumes are retained; the rest of the 512-byte header region
/// (record ids, table offsets, checksums) is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvtxChunkHeader {
    pub first_event_record_number: u64,
    pub last_event_record_number: u64,
    pub header_size: u32,
}

impl EvtxChunkHeader {
    /// Returns `None` for an empty chunk slot (all-zero magic); a nonzero
    /// mismatch is fatal.
    pub fn from_reader(cursor: &mut Cursor<&[u8]>) -> Result<Option<EvtxChunkHeader>> {
        let offset = cursor.position();
        let mut magic = [0_u8; 8];
        cursor
            .read_exact(&mut magic)
            .map_err(|e| EvtxError::from_io(e, offset, "chunk_header_magic"))?;

        if magic == [0_u8; 8] {
            return Ok(None);
        }

        if &magic != b"ElfChnk\x00" {
            return Err(EvtxError::InvalidEvtxChunkMagic { magic });
        }

        let first_event_record_number =
            try_read!(cursor, u64, "chunk_first_event_record_number")?;
        let last_event_record_number = try_read!(cursor, u64, "chunk_last_event_record_number")?;

        // First/last event record ids, unused here.
        cursor.seek(SeekFrom::Current(16))?;

        let header_size = try_read!(cursor, u32, "chunk_header_size")?;

        Ok(Some(EvtxChunkHeader {
            first_event_record_number,
            last_event_record_number,
            header_size,
        }))
    }
}

/// A single 64 KiB chunk.
pub(crate) struct EvtxChunk<'a> {
    pub data: &'a [u8],
    pub header: EvtxChunkHeader,
}

impl<'a> EvtxChunk<'a> {
    /// Returns `None` for an empty chunk slot.
    pub fn new(data: &'a [u8]) -> Result<Option<EvtxChunk<'a>>> {
        let mut cursor = Cursor::new(data);
        Ok(EvtxChunkHeader::from_reader(&mut cursor)?
            .map(|header| EvtxChunk { data, header }))
    }

    /// Walks the records in the chunk, invoking `handler` for each one.
    ///
    /// Iteration stops at the first record slot whose magic does not match:
    /// chunks pad unused space with stale bytes, so that is the regular end
    /// of a chunk, not an error.
    pub fn for_each_record<F>(
        &self,
        interpreter: &mut BinXmlInterpreter,
        handler: &mut F,
    ) -> Result<()>
    where
        F: FnMut(DateTime<Utc>, RecordId, &HashMap<String, String>),
    {
        let chunk_size = self.data.len() as u64;
        let mut cursor = Cursor::new(self.data);
        cursor.set_position(EVTX_CHUNK_HEADER_SIZE);

        loop {
            let record_start = cursor.position();
            if record_start + u64::from(EVTX_RECORD_HEADER_SIZE) > chunk_size {
                break;
            }

            let header = match EvtxRecordHeader::from_reader(&mut cursor)? {
                Some(header) => header,
                None => break,
            };

            trace!(
                "Record {} at offset 0x{:08x}, size {}",
                header.event_record_id,
                record_start,
                header.data_size
            );

            header.validate_size(record_start, chunk_size)?;

            interpreter.reset_per_record();
            interpreter.parse_fragment(&mut cursor)?;

            handler(
                datetime_from_filetime(header.timestamp),
                header.event_record_id,
                interpreter.variables(),
            );

            // Resume at the next record boundary regardless of how much of
            // the body the interpreter consumed.
            cursor.set_position(record_start + u64::from(header.data_size));
        }

        debug!(
            "Finished chunk (records {}..={})",
            self.header.first_event_record_number, self.header.last_event_record_number
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_an_all_zero_slot_is_an_empty_chunk() {
        let data = vec![0_u8; EVTX_CHUNK_SIZE];
        let mut cursor = Cursor::new(data.as_slice());
        assert_eq!(EvtxChunkHeader::from_reader(&mut cursor).unwrap(), None);
    }

    #[test]
    fn test_a_nonzero_magic_mismatch_is_fatal() {
        let mut data = vec![0_u8; EVTX_CHUNK_SIZE];
        data[..8].copy_from_slice(b"ElfChnk\x01");
        let mut cursor = Cursor::new(data.as_slice());

        assert!(matches!(
            EvtxChunkHeader::from_reader(&mut cursor),
            Err(EvtxError::InvalidEvtxChunkMagic { .. })
        ));
    }

    #[test]
    fn test_parses_the_retained_header_fields() {
        let mut data = vec![0_u8; EVTX_CHUNK_SIZE];
        data[..8].copy_from_slice(b"ElfChnk\x00");
        data[8..16].copy_from_slice(&1_u64.to_le_bytes());
        data[16..24].copy_from_slice(&91_u64.to_le_bytes());
        data[40..44].copy_from_slice(&128_u32.to_le_bytes());

        let mut cursor = Cursor::new(data.as_slice());
        let header = EvtxChunkHeader::from_reader(&mut cursor).unwrap().unwrap();

        assert_eq!(
            header,
            EvtxChunkHeader {
                first_event_record_number: 1,
                last_event_record_number: 91,
                header_size: 128,
            }
        );
    }
}
