use crate::err::{EvtxError, Result};

use byteorder::ReadBytesExt;
use std::fmt;
use std::io::{Cursor, Read, Seek};

/// A Windows GUID as laid out on the wire: `u32 u16 u16 [u8; 8]` with the
/// integer fields little-endian.
#[derive(PartialEq, Eq, Clone)]
pub struct Guid {
    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8],
}

impl Guid {
    pub fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Guid {
        Guid {
            data1,
            data2,
            data3,
            data4,
        }
    }

    pub fn from_stream(cursor: &mut Cursor<&[u8]>) -> Result<Guid> {
        let data1 = try_read!(cursor, u32, "guid_data1")?;
        let data2 = try_read!(cursor, u16, "guid_data2")?;
        let data3 = try_read!(cursor, u16, "guid_data3")?;

        let offset = cursor.position();
        let mut data4 = [0_u8; 8];
        cursor
            .read_exact(&mut data4)
            .map_err(|e| EvtxError::from_io(e, offset, "guid_data4"))?;

        Ok(Guid {
            data1,
            data2,
            data3,
            data4,
        })
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7]
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: [u8; 16] = [
        0x78, 0x56, 0x34, 0x12, 0x34, 0x12, 0x78, 0x56, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        0x08,
    ];

    #[test]
    fn test_formats_wire_bytes() {
        let mut cursor = Cursor::new(&SAMPLE[..]);
        let guid = Guid::from_stream(&mut cursor).unwrap();

        assert_eq!(guid.to_string(), "12345678-1234-5678-0102-030405060708");
        assert_eq!(cursor.position(), 16);
    }

    #[test]
    fn test_display_is_idempotent() {
        let mut cursor = Cursor::new(&SAMPLE[..]);
        let guid = Guid::from_stream(&mut cursor).unwrap();
        let formatted = guid.to_string();

        // Reassemble the wire bytes from the string form.
        let groups: Vec<&str> = formatted.split('-').collect();
        let data1 = u32::from_str_radix(groups[0], 16).unwrap();
        let data2 = u16::from_str_radix(groups[1], 16).unwrap();
        let data3 = u16::from_str_radix(groups[2], 16).unwrap();

        let tail: Vec<u8> = format!("{}{}", groups[3], groups[4])
            .as_bytes()
            .chunks(2)
            .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap())
            .collect();

        let reparsed = Guid::new(data1, data2, data3, tail.try_into().unwrap());
        assert_eq!(reparsed, guid);
    }

    #[test]
    fn test_short_input_is_truncated() {
        let mut cursor = Cursor::new(&SAMPLE[..10]);
        assert!(matches!(
            Guid::from_stream(&mut cursor),
            Err(EvtxError::Truncated { .. })
        ));
    }
}
