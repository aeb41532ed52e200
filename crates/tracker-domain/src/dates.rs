//! Date parsing for the display strings the API sends with purchases.
//!
//! Purchase dates arrive in several shapes depending on the endpoint:
//! ISO (`2024-01-15`, optionally with a time part), long US form
//! (`January 15, 2024`), abbreviated (`Jan 15, 2024`) and numeric US
//! (`01/15/2024`).

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%m/%d/%Y"];

/// Parses a purchase date string, returning `None` for anything unrecognised.
pub fn parse_purchase_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(stamp.date());
    }
    None
}

/// `January 2024`
pub fn month_year_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// `January 5, 2024`
pub fn long_date_label(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `2024-01`
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_shapes() {
        assert_eq!(parse_purchase_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_purchase_date("January 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_purchase_date("Jan 5, 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_purchase_date("01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(
            parse_purchase_date("2024-01-15T10:30:00Z"),
            Some(ymd(2024, 1, 15))
        );
        assert_eq!(
            parse_purchase_date("2024-01-15T10:30:00"),
            Some(ymd(2024, 1, 15))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_purchase_date(""), None);
        assert_eq!(parse_purchase_date("yesterday"), None);
    }

    #[test]
    fn labels_match_display_conventions() {
        assert_eq!(month_year_label(ymd(2024, 3, 9)), "March 2024");
        assert_eq!(long_date_label(ymd(2024, 3, 9)), "March 9, 2024");
        assert_eq!(month_key(ymd(2024, 3, 9)), "2024-03");
    }
}
