//! Civil calendar helpers.
//!
//! Every date comparison in the crate happens on the employer's civil
//! calendar, which sits at a fixed UTC+05:30. Convert instants through
//! these helpers instead of building offsets at call sites.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Offset of the civil calendar from UTC, in seconds (05:30).
pub const CIVIL_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub fn civil_offset() -> FixedOffset {
    match FixedOffset::east_opt(CIVIL_OFFSET_SECS) {
        Some(offset) => offset,
        None => unreachable!("05:30 is inside the +/-24h offset range"),
    }
}

/// The instant expressed as a civil date-time.
pub fn to_civil_datetime(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&civil_offset())
}

/// The civil calendar day an instant falls on.
pub fn to_civil_date(instant: DateTime<Utc>) -> NaiveDate {
    to_civil_datetime(instant).date_naive()
}

/// `15 Jan 2024`
pub fn format_civil_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// `15 Jan 2024, 02:30 PM` on the civil calendar.
pub fn format_civil_datetime(instant: DateTime<Utc>) -> String {
    to_civil_datetime(instant)
        .format("%d %b %Y, %I:%M %p")
        .to_string()
}

/// Parses a `YYYY-MM-DD` civil date.
pub fn parse_civil_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
}
