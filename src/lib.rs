//! A parser for the Windows Event Log binary file format (EVTX) that
//! flattens every event record into a `name -> stringified value` map.
//!
//! The heavy lifting is the BinXML decoder: a stateful walk over a tokenized
//! XML representation with reusable templates, where each record
//! instantiates a template with a typed argument vector.
//!
//! ```no_run
//! # fn main() -> evtx_flat::err::Result<()> {
//! let mut parser = evtx_flat::EvtxParser::from_path("System.evtx")?;
//! parser.for_each_record(|timestamp, record_id, values| {
//!     println!("{} #{}: {} values", timestamp, record_id, values.len());
//! })?;
//! # Ok(())
//! # }
//! ```

#![deny(unused_must_use)]
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

pub use evtx_chunk::{EvtxChunkHeader, EVTX_CHUNK_SIZE};
pub use evtx_file_header::{EvtxFileHeader, HeaderFlags, EVTX_FILE_HEADER_SIZE};
pub use evtx_parser::{EvtxParser, ReadSeek};
pub use evtx_record::{EvtxRecordHeader, RecordId};
pub use guid::Guid;
pub use ntsid::Sid;

pub mod binxml;
pub mod err;

mod evtx_chunk;
mod evtx_file_header;
mod evtx_parser;
mod evtx_record;
mod guid;
mod ntsid;
mod template_cache;
mod utils;

// For tests, we only initialize logging once.
#[cfg(test)]
use std::sync::Once;

#[cfg(test)]
static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub(crate) fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .init();
    });
}
