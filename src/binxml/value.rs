use crate::err::Result;
use crate::guid::Guid;
use crate::ntsid::Sid;
use crate::utils::{
    decode_utf16_lossy, format_filetime, format_systemtime, read_exact_bytes, read_utf16_by_size,
};

use byteorder::ReadBytesExt;
use std::io::{Cursor, Seek, SeekFrom};

/// Wire value kinds accepted in substitution descriptors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinXmlValueType {
    NullType,
    StringType,
    AnsiStringType,
    UInt8Type,
    UInt16Type,
    Int32Type,
    UInt32Type,
    Int64Type,
    UInt64Type,
    Real64Type,
    BoolType,
    BinaryType,
    GuidType,
    FileTimeType,
    SysTimeType,
    SidType,
    HexInt32Type,
    HexInt64Type,
    BinXmlType,
    StringArrayType,
}

impl BinXmlValueType {
    /// The descriptor transmits the type as a 16-bit slot; in practice the
    /// padding half is zero, so the whole word is matched.
    pub fn from_u16(value: u16) -> Option<BinXmlValueType> {
        match value {
            0x00 => Some(BinXmlValueType::NullType),
            0x01 => Some(BinXmlValueType::StringType),
            0x02 => Some(BinXmlValueType::AnsiStringType),
            0x04 => Some(BinXmlValueType::UInt8Type),
            0x06 => Some(BinXmlValueType::UInt16Type),
            0x07 => Some(BinXmlValueType::Int32Type),
            0x08 => Some(BinXmlValueType::UInt32Type),
            0x09 => Some(BinXmlValueType::Int64Type),
            0x0a => Some(BinXmlValueType::UInt64Type),
            0x0c => Some(BinXmlValueType::Real64Type),
            0x0d => Some(BinXmlValueType::BoolType),
            0x0e => Some(BinXmlValueType::BinaryType),
            0x0f => Some(BinXmlValueType::GuidType),
            0x11 => Some(BinXmlValueType::FileTimeType),
            0x12 => Some(BinXmlValueType::SysTimeType),
            0x13 => Some(BinXmlValueType::SidType),
            0x14 => Some(BinXmlValueType::HexInt32Type),
            0x15 => Some(BinXmlValueType::HexInt64Type),
            0x21 => Some(BinXmlValueType::BinXmlType),
            0x81 => Some(BinXmlValueType::StringArrayType),
            _ => None,
        }
    }
}

/// Decodes one sized value into its string form.
///
/// `BinXmlType` recurses into the token stream and is handled by the
/// interpreter; it must not reach this function.
pub fn decode_sized_value_type(
    value_type: &BinXmlValueType,
    cursor: &mut Cursor<&[u8]>,
    size: u16,
) -> Result<String> {
    let value = match value_type {
        // A null substitution still carries payload bytes; render them the
        // same way as a binary blob.
        BinXmlValueType::NullType | BinXmlValueType::BinaryType => {
            let bytes = read_exact_bytes(cursor, usize::from(size), "binary_value")?;
            bytes.iter().map(|b| format!("{:02X}", b)).collect()
        }
        BinXmlValueType::StringType => {
            let mut s = read_utf16_by_size(cursor, u64::from(size / 2) * 2)?;
            if s.ends_with('\0') {
                s.pop();
            }
            format!("'{}'", s)
        }
        BinXmlValueType::AnsiStringType => {
            let mut bytes = read_exact_bytes(cursor, usize::from(size), "ansi_string_value")?;
            if bytes.last() == Some(&0) {
                bytes.pop();
            }
            format!("'{}'", String::from_utf8_lossy(&bytes))
        }
        BinXmlValueType::UInt8Type => format!("{:02}", try_read!(cursor, u8, "u8_value")?),
        BinXmlValueType::UInt16Type => format!("{:04}", try_read!(cursor, u16, "u16_value")?),
        BinXmlValueType::Int32Type => format!("{:08}", try_read!(cursor, i32, "i32_value")?),
        BinXmlValueType::UInt32Type => format!("{:08}", try_read!(cursor, u32, "u32_value")?),
        BinXmlValueType::Int64Type => format!("{:016}", try_read!(cursor, i64, "i64_value")?),
        BinXmlValueType::UInt64Type => format!("{:016}", try_read!(cursor, u64, "u64_value")?),
        BinXmlValueType::Real64Type => format!("{:.6}", try_read!(cursor, f64, "f64_value")?),
        BinXmlValueType::BoolType => {
            let byte = try_read!(cursor, u8, "bool_value")?;
            if size > 1 {
                cursor.seek(SeekFrom::Current(i64::from(size) - 1))?;
            }
            String::from(if byte == 0 { "false" } else { "true" })
        }
        BinXmlValueType::GuidType => Guid::from_stream(cursor)?.to_string(),
        BinXmlValueType::FileTimeType => {
            format_filetime(try_read!(cursor, u64, "filetime_value")?)
        }
        BinXmlValueType::SysTimeType => {
            let mut fields = [0_u16; 8];
            for field in fields.iter_mut() {
                *field = try_read!(cursor, u16, "systemtime_value")?;
            }
            format_systemtime(&fields)
        }
        BinXmlValueType::SidType => Sid::from_stream_sized(cursor, size)?.to_string(),
        BinXmlValueType::HexInt32Type => {
            format!("0x{:08X}", try_read!(cursor, u32, "hex32_value")?)
        }
        BinXmlValueType::HexInt64Type => {
            format!("0x{:016X}", try_read!(cursor, u64, "hex64_value")?)
        }
        BinXmlValueType::StringArrayType => {
            let mut code_units = Vec::with_capacity(usize::from(size / 2));
            for _ in 0..size / 2 {
                code_units.push(try_read!(cursor, u16, "string_array_value")?);
            }

            // Only NUL-terminated segments are rendered; a trailing
            // unterminated run is dropped.
            let mut rendered = String::from("[");
            let mut segment_start = 0;
            for (i, &unit) in code_units.iter().enumerate() {
                if unit == 0 {
                    rendered.push('\'');
                    rendered.push_str(&decode_utf16_lossy(&code_units[segment_start..i]));
                    rendered.push_str("',");
                    segment_start = i + 1;
                }
            }
            rendered.push(']');
            rendered
        }
        BinXmlValueType::BinXmlType => {
            unreachable!("BinXmlType values are decoded by the interpreter")
        }
    };

    Ok(value)
}
