use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvtxError>;

#[derive(Debug, Error)]
pub enum EvtxError {
    #[error("An I/O error has occurred")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to open file {}", path.display())]
    FailedToOpenFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Offset {offset}: unexpected end of data while reading {t}")]
    Truncated { offset: u64, t: &'static str },

    #[error("Invalid EVTX file header magic, expected `ElfFile0`, found `{magic:02X?}`")]
    InvalidEvtxFileHeaderMagic { magic: [u8; 8] },

    #[error("Unsupported EVTX file version `{major}.{minor}`, only version `3.1` is supported")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("Invalid EVTX chunk header magic, expected `ElfChnk0`, found `{magic:02X?}`")]
    InvalidEvtxChunkMagic { magic: [u8; 8] },

    #[error("Offset {offset}: expected template instance to begin with `0x01`, found `{value:#04x}`")]
    InvalidTemplateInstanceMagic { value: u8, offset: u64 },

    #[error("Record {record_id}: declared size {size} is smaller than the record header")]
    RecordSizeSmallerThanHeader { record_id: u64, size: u32 },

    #[error("Record {record_id}: declared size {size} exceeds the enclosing chunk")]
    RecordExceedsChunk { record_id: u64, size: u32 },

    #[error("Offset {offset}: tried to read an invalid byte `{value:#04x}` as a binxml token")]
    InvalidToken { value: u8, offset: u64 },

    #[error("Offset {offset}: tried to read an invalid value `{value:#06x}` as a binxml value type")]
    InvalidValueType { value: u16, offset: u64 },
}

impl EvtxError {
    /// Short reads become `Truncated` so callers see where the data ran out;
    /// anything else stays an I/O error.
    pub(crate) fn from_io(source: std::io::Error, offset: u64, t: &'static str) -> Self {
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            EvtxError::Truncated { offset, t }
        } else {
            EvtxError::Io { source }
        }
    }
}
