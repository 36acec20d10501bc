/// Tries to read a little-endian primitive from the cursor, mapping a short
/// read to `Truncated` with the position at which the read was attempted.
macro_rules! try_read {
    ($cursor: expr, u8) => {
        try_read!($cursor, u8, "u8")
    };
    ($cursor: expr, u16) => {
        try_read!($cursor, u16, "u16")
    };
    ($cursor: expr, u32) => {
        try_read!($cursor, u32, "u32")
    };
    ($cursor: expr, u64) => {
        try_read!($cursor, u64, "u64")
    };
    ($cursor: expr, i32) => {
        try_read!($cursor, i32, "i32")
    };
    ($cursor: expr, i64) => {
        try_read!($cursor, i64, "i64")
    };
    ($cursor: expr, f64) => {
        try_read!($cursor, f64, "f64")
    };

    ($cursor: expr, u8, $name: expr) => {{
        let offset = $cursor.stream_position().unwrap_or_default();
        $cursor
            .read_u8()
            .map_err(|e| $crate::err::EvtxError::from_io(e, offset, $name))
    }};
    ($cursor: expr, u16, $name: expr) => {{
        let offset = $cursor.stream_position().unwrap_or_default();
        $cursor
            .read_u16::<byteorder::LittleEndian>()
            .map_err(|e| $crate::err::EvtxError::from_io(e, offset, $name))
    }};
    ($cursor: expr, u32, $name: expr) => {{
        let offset = $cursor.stream_position().unwrap_or_default();
        $cursor
            .read_u32::<byteorder::LittleEndian>()
            .map_err(|e| $crate::err::EvtxError::from_io(e, offset, $name))
    }};
    ($cursor: expr, u64, $name: expr) => {{
        let offset = $cursor.stream_position().unwrap_or_default();
        $cursor
            .read_u64::<byteorder::LittleEndian>()
            .map_err(|e| $crate::err::EvtxError::from_io(e, offset, $name))
    }};
    ($cursor: expr, i32, $name: expr) => {{
        let offset = $cursor.stream_position().unwrap_or_default();
        $cursor
            .read_i32::<byteorder::LittleEndian>()
            .map_err(|e| $crate::err::EvtxError::from_io(e, offset, $name))
    }};
    ($cursor: expr, i64, $name: expr) => {{
        let offset = $cursor.stream_position().unwrap_or_default();
        $cursor
            .read_i64::<byteorder::LittleEndian>()
            .map_err(|e| $crate::err::EvtxError::from_io(e, offset, $name))
    }};
    ($cursor: expr, f64, $name: expr) => {{
        let offset = $cursor.stream_position().unwrap_or_default();
        $cursor
            .read_f64::<byteorder::LittleEndian>()
            .map_err(|e| $crate::err::EvtxError::from_io(e, offset, $name))
    }};
}
