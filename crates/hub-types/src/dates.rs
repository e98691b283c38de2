//! Event date handling.
//!
//! The API stores dates as free-form strings; in practice `YYYY-MM-DD` or a
//! full RFC 3339 timestamp.

use chrono::{DateTime, NaiveDate};

/// Parse an event date, accepting `YYYY-MM-DD`, RFC 3339, or any string that
/// starts with a `YYYY-MM-DD` prefix.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Render a date as `DD/MM/YYYY`, or the input unchanged if it does not parse.
pub fn format_date_ddmmyyyy(raw: &str) -> String {
    match parse_event_date(raw) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(parse_event_date("2024-05-01"), expected);
        assert_eq!(parse_event_date("2024-05-01T09:30:00Z"), expected);
        assert_eq!(parse_event_date("2024-05-01 09:30"), expected);
        assert_eq!(parse_event_date("   "), None);
        assert_eq!(parse_event_date("soon"), None);
    }

    #[test]
    fn formats_day_first() {
        assert_eq!(format_date_ddmmyyyy("2024-05-01"), "01/05/2024");
        assert_eq!(format_date_ddmmyyyy("next spring"), "next spring");
    }
}
