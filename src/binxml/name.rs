use crate::err::Result;
use crate::utils::read_len_prefixed_utf16_string;

use byteorder::ReadBytesExt;
use std::io::{Cursor, Seek, SeekFrom};

/// Resolves a name reference: a `u32` absolute offset into the chunk.
///
/// When the offset points at the position immediately following the offset
/// field the name is stored inline and read in place; otherwise the target
/// is read out-of-line and the original position restored.
pub fn read_name(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let name_offset = try_read!(cursor, u32, "name_offset")?;
    let position_before = cursor.position();

    if u64::from(name_offset) != position_before {
        cursor.seek(SeekFrom::Start(u64::from(name_offset)))?;
        let name = read_name_at_cursor(cursor)?;
        cursor.seek(SeekFrom::Start(position_before))?;
        return Ok(name);
    }

    read_name_at_cursor(cursor)
}

/// Layout at the target offset: a `u32` link to the next string bucket entry
/// and a `u16` name hash (both unused here), then a length-prefixed UTF-16
/// string with a null terminator.
fn read_name_at_cursor(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let _next_string_offset = try_read!(cursor, u32, "name_next_string_offset")?;
    let _name_hash = try_read!(cursor, u16, "name_hash")?;

    read_len_prefixed_utf16_string(cursor, true)
}
