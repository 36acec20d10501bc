use chrono::{DateTime, Utc};

/// 1601-01-01T00:00:00Z in 100-ns intervals before the Unix epoch.
const FILETIME_UNIX_EPOCH_DELTA: i64 = 116_444_736_000_000_000;

/// Converts a Windows FILETIME (100-ns intervals since 1601-01-01 UTC) to a
/// UTC timestamp with second resolution. Values before 1601 follow integer
/// division semantics.
pub fn datetime_from_filetime(filetime: u64) -> DateTime<Utc> {
    let unix_seconds = ((filetime as i64) - FILETIME_UNIX_EPOCH_DELTA) / 10_000_000;

    DateTime::from_timestamp(unix_seconds, 0).unwrap_or_default()
}

/// `YYYY-MM-DDThh:mm:ssZ`; sub-second digits are dropped.
pub fn format_filetime(filetime: u64) -> String {
    datetime_from_filetime(filetime)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Formats raw SYSTEMTIME fields without validating them as a calendar date.
/// Field 2 (day of week) and field 7 (milliseconds) are not rendered.
pub fn format_systemtime(fields: &[u16; 8]) -> String {
    format!(
        "SYSTI{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        fields[0], fields[1], fields[3], fields[4], fields[5], fields[6]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_converts_a_known_filetime() {
        assert_eq!(
            format_filetime(132_223_104_000_000_000),
            "2020-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_filetime_zero_is_the_windows_epoch() {
        assert_eq!(format_filetime(0), "1601-01-01T00:00:00Z");
    }

    #[test]
    fn test_sub_second_intervals_are_dropped() {
        // 9_999_999 intervals shy of a full second.
        assert_eq!(
            format_filetime(132_223_104_009_999_999),
            "2020-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_formats_systemtime_fields_verbatim() {
        let fields = [2019_u16, 12, 6, 31, 23, 59, 58, 999];
        assert_eq!(format_systemtime(&fields), "SYSTI2019-12-31T23:59:58Z");
    }
}
