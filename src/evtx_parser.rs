use crate::binxml::interpreter::BinXmlInterpreter;
use crate::err::{EvtxError, Result};
use crate::evtx_chunk::{EvtxChunk, EVTX_CHUNK_SIZE};
use crate::evtx_file_header::{EvtxFileHeader, EVTX_FILE_HEADER_SIZE};
use crate::evtx_record::RecordId;

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

pub trait ReadSeek: Read + Seek {
    fn tell(&mut self) -> io::Result<u64> {
        self.stream_position()
    }
}

impl<T: Read + Seek> ReadSeek for T {}

/// A single-threaded EVTX parser over any seekable byte source.
///
/// Construction validates the file header; `for_each_record` then drives the
/// read loop to completion or to the first fatal error. All mutable decode
/// state is owned by the instance, so distinct files can be parsed
/// concurrently by allocating independent parsers.
pub struct EvtxParser<T: ReadSeek> {
    data: T,
    header: EvtxFileHeader,
}

impl EvtxParser<File> {
    /// Attempts to load an EVTX file from disk, verifying the file header.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| EvtxError::FailedToOpenFile {
            source: e,
            path: path.to_path_buf(),
        })?;

        Self::from_read_seek(file)
    }
}

impl EvtxParser<Cursor<Vec<u8>>> {
    /// Attempts to load an EVTX file from an in-memory buffer, verifying the
    /// file header.
    pub fn from_buffer(buffer: Vec<u8>) -> Result<Self> {
        Self::from_read_seek(Cursor::new(buffer))
    }
}

impl<T: ReadSeek> EvtxParser<T> {
    pub fn from_read_seek(mut data: T) -> Result<Self> {
        data.seek(SeekFrom::Start(0))?;
        let header = EvtxFileHeader::from_stream(&mut data)?;

        debug!("EVTX file header: {:?}", header);

        Ok(EvtxParser { data, header })
    }

    pub fn header(&self) -> &EvtxFileHeader {
        &self.header
    }

    /// Drives the read loop over every chunk in the file, invoking `handler`
    /// once per decoded record with `(timestamp, record number, values)`.
    ///
    /// The values map is borrowed and only valid for the duration of the
    /// call; it is reused for the next record. Iteration order over the map
    /// is unspecified.
    pub fn for_each_record<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(DateTime<Utc>, RecordId, &HashMap<String, String>),
    {
        self.data.seek(SeekFrom::Start(EVTX_FILE_HEADER_SIZE))?;

        let mut chunk_data = vec![0_u8; EVTX_CHUNK_SIZE];
        let mut interpreter = BinXmlInterpreter::new();
        let mut chunk_number = 0_usize;

        loop {
            if !read_chunk_data(&mut self.data, &mut chunk_data)? {
                info!("Reached EOF after {} chunks", chunk_number);
                break;
            }

            interpreter.reset();

            match EvtxChunk::new(&chunk_data)? {
                Some(chunk) => {
                    debug!(
                        "Chunk {}: records {}..={}",
                        chunk_number,
                        chunk.header.first_event_record_number,
                        chunk.header.last_event_record_number
                    );
                    chunk.for_each_record(&mut interpreter, &mut handler)?;
                }
                None => debug!("Chunk {} is an empty slot", chunk_number),
            }

            chunk_number += 1;
        }

        Ok(())
    }
}

/// Fills `buf` with the next chunk. Zero bytes at a chunk boundary is a
/// clean EOF (`false`); a partial chunk is `Truncated`.
fn read_chunk_data<T: ReadSeek>(data: &mut T, buf: &mut [u8]) -> Result<bool> {
    let offset = data.tell().unwrap_or_default();

    let mut filled = 0;
    while filled < buf.len() {
        match data.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(EvtxError::Io { source: e }),
        }
    }

    if filled == 0 {
        return Ok(false);
    }

    if filled < buf.len() {
        return Err(EvtxError::Truncated {
            offset,
            t: "chunk_data",
        });
    }

    Ok(true)
}
