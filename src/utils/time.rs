//! 时间工具函数
//!
//! Repositories and models store `i64` Unix millis; formatting into the
//! customer-facing Indonesian long date happens at the handler layer.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Indonesian month names for receipt/ticket dates
const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Format Unix millis as `dd MMMM yyyy HH:mm` (e.g. "05 Agustus 2026 14:30")
///
/// Returns "-" when the timestamp cannot be represented.
pub fn format_readable_date(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(dt) => {
            let month = MONTHS_ID[(dt.month0()) as usize];
            format!(
                "{:02} {} {} {:02}:{:02}",
                dt.day(),
                month,
                dt.year(),
                dt.hour(),
                dt.minute()
            )
        }
        None => "-".to_string(),
    }
}

/// Split Unix millis into short date and 12-hour time strings
/// (e.g. "Aug 5, 2026", "2:30 PM") for the session history view.
pub fn format_date_time_short(millis: i64) -> (String, String) {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(dt) => {
            let date = dt.format("%b %-d, %Y").to_string();
            let time = dt.format("%-I:%M %p").to_string();
            (date, time)
        }
        None => ("-".to_string(), "-".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_readable_date() {
        // August 2026
        let millis = 1_786_285_800_000;
        let formatted = format_readable_date(millis);
        assert!(formatted.contains("2026"));
        assert!(formatted.contains("Agustus"));
    }

    #[test]
    fn test_format_readable_date_invalid() {
        assert_eq!(format_readable_date(i64::MAX), "-");
    }

    #[test]
    fn test_month_names_cover_year() {
        for m in 1..=12u32 {
            let dt = chrono::NaiveDate::from_ymd_opt(2026, m, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc();
            let s = format_readable_date(dt.timestamp_millis());
            assert!(s.contains(MONTHS_ID[(m - 1) as usize]));
        }
    }
}
