use crate::err::{EvtxError, Result};

use byteorder::ReadBytesExt;
use std::char;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Reads a `u16` code-unit count followed by that many UTF-16LE code units.
/// With `is_null_terminated`, two extra bytes are skipped after the payload
/// (the terminator is not part of the declared length).
pub fn read_len_prefixed_utf16_string(
    cursor: &mut Cursor<&[u8]>,
    is_null_terminated: bool,
) -> Result<String> {
    let expected_number_of_characters = try_read!(cursor, u16, "utf16_string_len")?;
    let s = read_utf16_by_size(cursor, u64::from(expected_number_of_characters) * 2)?;

    if is_null_terminated {
        try_read!(cursor, u16, "utf16_string_nul_terminator")?;
    }

    Ok(s)
}

/// Reads `size` bytes of UTF-16LE data and transcodes them.
pub fn read_utf16_by_size(cursor: &mut Cursor<&[u8]>, size: u64) -> Result<String> {
    let offset = cursor.position();
    let data = *cursor.get_ref();

    let start = offset as usize;
    let end = start + size as usize;

    if end > data.len() {
        return Err(EvtxError::Truncated {
            offset,
            t: "utf16_string",
        });
    }

    let code_units: Vec<u16> = data[start..end]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    cursor.seek(SeekFrom::Current(size as i64))?;

    Ok(decode_utf16_lossy(&code_units))
}

/// Unpaired surrogates are replaced with U+FFFD; for BMP text the decoding
/// round-trips exactly.
pub fn decode_utf16_lossy(code_units: &[u16]) -> String {
    char::decode_utf16(code_units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

pub fn read_exact_bytes(cursor: &mut Cursor<&[u8]>, len: usize, t: &'static str) -> Result<Vec<u8>> {
    let offset = cursor.position();
    let mut buf = vec![0_u8; len];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| EvtxError::from_io(e, offset, t))?;

    Ok(buf)
}
