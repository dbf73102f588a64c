//! Parsing of the free text dates stored on transactions.

use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

/// Parse a transaction date.
///
/// Accepts a calendar date such as `2025-06-01` or an RFC 3339 timestamp such
/// as `2025-06-01T09:30:00Z`, in which case the date in the timestamp's own
/// offset is used. Timestamps without an offset fall back to their first ten
/// characters. Returns `None` for anything else.
pub fn parse_transaction_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    let calendar_date = format_description!("[year]-[month]-[day]");

    if let Ok(date) = Date::parse(raw, calendar_date) {
        return Some(date);
    }

    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(date_time.date());
    }

    raw.get(..10)
        .and_then(|prefix| Date::parse(prefix, calendar_date).ok())
}
