//! Column decoding and SQL text helpers shared by the repositories.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::LedgerError;

/// Get a column value, mapping decode failures to [`LedgerError::CorruptRow`].
pub fn get<T: rusqlite::types::FromSql>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    table: &'static str,
    column: &'static str,
) -> Result<T, LedgerError> {
    row.get(idx).map_err(|e| LedgerError::CorruptRow {
        table,
        column,
        detail: e.to_string(),
    })
}

/// Parse a text column into an enum.
pub fn parse_enum<T: std::str::FromStr>(
    raw: &str,
    table: &'static str,
    column: &'static str,
) -> Result<T, LedgerError> {
    raw.parse().map_err(|_| LedgerError::CorruptRow {
        table,
        column,
        detail: format!("unknown variant: {raw}"),
    })
}

/// Parse a JSON text column.
pub fn parse_json(
    raw: &str,
    table: &'static str,
    column: &'static str,
) -> Result<serde_json::Value, LedgerError> {
    serde_json::from_str(raw).map_err(|e| LedgerError::CorruptRow {
        table,
        column,
        detail: format!("invalid JSON: {e}"),
    })
}

/// Escape LIKE special characters. Use with `ESCAPE '\'`.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Timestamp text form used in every column: `2025-01-31T23:59:59Z`.
///
/// Fixed width and UTC, so lexical order equals chronological order.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time in column form.
pub fn now_ts() -> String {
    format_ts(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn escape_like_special_chars() {
        assert_eq!(escape_like("hello"), "hello");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("api_7"), "api\\_7");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn timestamps_are_second_precision_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_ts(ts), "2024-01-01T12:00:00Z");
    }

    #[test]
    fn timestamps_sort_lexically() {
        let a = format_ts(Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap());
        let b = format_ts(Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert!(a < b);
    }

    #[test]
    fn parse_enum_reports_column() {
        let err = parse_enum::<crate::ActivityStatus>("paused", "activities", "status").unwrap_err();
        assert!(err.to_string().contains("activities.status"));
    }

    #[test]
    fn parse_json_rejects_garbage() {
        assert!(parse_json("{", "activities", "details").is_err());
        assert_eq!(
            parse_json(r#"{"a":1}"#, "activities", "details").unwrap()["a"],
            1
        );
    }
}
