use crate::err::{EvtxError, Result};

use byteorder::ReadBytesExt;
use std::io::{Cursor, Read, Seek};

pub type RecordId = u64;

pub(crate) const EVTX_RECORD_HEADER_SIZE: u32 = 24;

/// Fixed-size header at the start of every event record. The timestamp is
/// kept as the raw FILETIME; the driver converts it when delivering the
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvtxRecordHeader {
    /// Total record size in bytes, header included.
    pub data_size: u32,
    pub event_record_id: RecordId,
    pub timestamp: u64,
}

impl EvtxRecordHeader {
    /// Returns `None` when the magic does not match. Within a chunk that
    /// marks leftover bytes from older records, not an error.
    pub fn from_reader(cursor: &mut Cursor<&[u8]>) -> Result<Option<EvtxRecordHeader>> {
        let offset = cursor.position();
        let mut magic = [0_u8; 4];
        cursor
            .read_exact(&mut magic)
            .map_err(|e| EvtxError::from_io(e, offset, "record_header_magic"))?;

        if &magic != b"\x2a\x2a\x00\x00" {
            return Ok(None);
        }

        let data_size = try_read!(cursor, u32, "record_data_size")?;
        let event_record_id = try_read!(cursor, u64, "record_event_record_id")?;
        let timestamp = try_read!(cursor, u64, "record_filetime")?;

        Ok(Some(EvtxRecordHeader {
            data_size,
            event_record_id,
            timestamp,
        }))
    }

    /// A record must hold at least its own header and stay inside the chunk
    /// it started in.
    pub fn validate_size(&self, record_start: u64, chunk_size: u64) -> Result<()> {
        if self.data_size < EVTX_RECORD_HEADER_SIZE {
            return Err(EvtxError::RecordSizeSmallerThanHeader {
                record_id: self.event_record_id,
                size: self.data_size,
            });
        }

        if record_start + u64::from(self.data_size) > chunk_size {
            return Err(EvtxError::RecordExceedsChunk {
                record_id: self.event_record_id,
                size: self.data_size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header_bytes(data_size: u32, record_id: u64, filetime: u64) -> Vec<u8> {
        let mut bytes = b"\x2a\x2a\x00\x00".to_vec();
        bytes.extend(data_size.to_le_bytes());
        bytes.extend(record_id.to_le_bytes());
        bytes.extend(filetime.to_le_bytes());
        bytes
    }

    #[test]
    fn test_parses_a_record_header() {
        let data = header_bytes(96, 7, 132_223_104_000_000_000);
        let mut cursor = Cursor::new(data.as_slice());

        let header = EvtxRecordHeader::from_reader(&mut cursor).unwrap().unwrap();
        assert_eq!(
            header,
            EvtxRecordHeader {
                data_size: 96,
                event_record_id: 7,
                timestamp: 132_223_104_000_000_000,
            }
        );
        assert_eq!(cursor.position(), 24);
    }

    #[test]
    fn test_stale_bytes_are_not_a_record() {
        let data = [0_u8; 24];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(EvtxRecordHeader::from_reader(&mut cursor).unwrap(), None);
    }

    #[test]
    fn test_rejects_a_size_smaller_than_the_header() {
        let data = header_bytes(16, 3, 0);
        let mut cursor = Cursor::new(data.as_slice());
        let header = EvtxRecordHeader::from_reader(&mut cursor).unwrap().unwrap();

        assert!(matches!(
            header.validate_size(512, 65536),
            Err(EvtxError::RecordSizeSmallerThanHeader { record_id: 3, size: 16 })
        ));
    }

    #[test]
    fn test_rejects_a_size_that_overflows_the_chunk() {
        let data = header_bytes(1024, 4, 0);
        let mut cursor = Cursor::new(data.as_slice());
        let header = EvtxRecordHeader::from_reader(&mut cursor).unwrap().unwrap();

        assert!(matches!(
            header.validate_size(65000, 65536),
            Err(EvtxError::RecordExceedsChunk { record_id: 4, size: 1024 })
        ));
    }
}
