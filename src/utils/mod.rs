mod binxml_utils;
mod time;

pub use self::binxml_utils::{
    decode_utf16_lossy, read_exact_bytes, read_len_prefixed_utf16_string, read_utf16_by_size,
};
pub use self::time::{datetime_from_filetime, format_filetime, format_systemtime};
