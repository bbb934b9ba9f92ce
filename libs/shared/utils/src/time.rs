use chrono::{NaiveDate, NaiveTime, Timelike};

pub const DISPLAY_TIME_FORMAT: &str = "%H:%M";
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Minute-resolution display form used by the booking UI, e.g. `"09:15"`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format(DISPLAY_TIME_FORMAT).to_string()
}

/// Accepts `HH:MM` or `HH:MM:SS`. Times are minute-resolution, so any
/// non-zero seconds are refused rather than silently carried along.
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, DISPLAY_TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .filter(|t| t.second() == 0 && t.nanosecond() == 0)
}

pub fn parse_query_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), QUERY_DATE_FORMAT).ok()
}
