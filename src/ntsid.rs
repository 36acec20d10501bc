use crate::err::Result;

use byteorder::{BigEndian, ReadBytesExt};
use std::fmt;
use std::io::{Cursor, Seek};

/// A Windows security identifier: a revision, a 6-byte big-endian authority
/// and a list of 32-bit sub-authorities.
#[derive(PartialEq, Eq, Clone)]
pub struct Sid {
    revision: u8,
    authority: u64,
    sub_authorities: Vec<u32>,
}

impl Sid {
    /// Reads a SID whose total length is declared by the enclosing value
    /// descriptor. The on-wire sub-authority count byte is informational
    /// only; the number of sub-authorities actually present is
    /// `(size - 8) / 4`.
    pub fn from_stream_sized(cursor: &mut Cursor<&[u8]>, size: u16) -> Result<Sid> {
        let revision = try_read!(cursor, u8, "sid_revision")?;
        let _sub_authority_count = try_read!(cursor, u8, "sid_sub_authority_count")?;

        let offset = cursor.position();
        let authority = cursor
            .read_u48::<BigEndian>()
            .map_err(|e| crate::err::EvtxError::from_io(e, offset, "sid_authority"))?;

        let present = if size > 8 { usize::from(size - 8) / 4 } else { 0 };
        let mut sub_authorities = Vec::with_capacity(present);
        for _ in 0..present {
            sub_authorities.push(try_read!(cursor, u32, "sid_sub_authority")?);
        }

        Ok(Sid {
            revision,
            authority,
            sub_authorities,
        })
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-{}", self.revision, self.authority)?;

        for sub_authority in &self.sub_authorities {
            write!(f, "-{}", sub_authority)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
