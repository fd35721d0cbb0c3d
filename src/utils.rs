use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%m/%d/%Y", "%d-%b-%Y",
    "%d %b %Y", "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses the date formats commonly found in sales exports.
///
/// Day-first readings win over month-first ones (`03/04/2024` is 3 April);
/// `MM/DD/YYYY` only applies when the day-first reading is not a valid date.
/// Datetimes are truncated to their calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Strips currency decoration (`₹`, `$`, thousands separators, a trailing `/-`).
pub fn clean_currency(raw: &str) -> String {
    raw.trim()
        .trim_end_matches("/-")
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | '$'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parses a currency-decorated amount. Non-finite results are rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = clean_currency(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

/// Number of calendar days in `[start, end]`, inclusive.
pub fn days_spanned(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024/01/15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("15-01-2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("15.01.2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("15-Jan-2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("Jan 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15 13:45:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T13:45:00+05:30"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_parse_date_prefers_day_first() {
        assert_eq!(parse_date("03/04/2024"), Some(ymd(2024, 4, 3)));
        // 25 is not a month, so only the month-first reading is valid
        assert_eq!(parse_date("12/25/2024"), Some(ymd(2024, 12, 25)));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-45"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,200"), Some(1200.0));
        assert_eq!(parse_amount("₹1,200/-"), Some(1200.0));
        assert_eq!(parse_amount(" $45.50 "), Some(45.5));
        assert_eq!(parse_amount("-20"), Some(-20.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_month_helpers() {
        assert_eq!(first_day_of_month(ymd(2024, 2, 29)), ymd(2024, 2, 1));
        assert_eq!(next_month_start(ymd(2024, 1, 31)), ymd(2024, 2, 1));
        assert_eq!(next_month_start(ymd(2023, 12, 1)), ymd(2024, 1, 1));
        assert_eq!(next_day(ymd(2024, 2, 28)), ymd(2024, 2, 29));
        assert_eq!(days_spanned(ymd(2024, 1, 1), ymd(2024, 1, 10)), 10);
    }
}
