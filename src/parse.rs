//! Best-effort parsing of duration and timestamp text.
//!
//! Spreadsheet exports store durations and timestamps as text. Values that
//! do not parse become `None` and are excluded from downstream sums; they
//! are never coerced to zero and never raise.

use chrono::{NaiveDateTime, TimeDelta};

/// Timestamp format used by the exports: day/month/year hour:minute:second.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Parse a timestamp in [`TIMESTAMP_FORMAT`]. Unparsable text is missing.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

/// Parse an operational-time value.
///
/// Accepted forms, matching what the exports actually contain:
/// - `H:MM:SS` (hours may exceed two digits)
/// - `H:MM:SS.fff` (fractional seconds kept at millisecond precision)
/// - `N days H:MM:SS[.fff]` / `N day H:MM:SS[.fff]`
///
/// Anything else is missing.
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (days, clock) = match text.split_once("day") {
        Some((n, rest)) => {
            let days: i64 = n.trim().parse().ok()?;
            // "days" or "day", optionally followed by a comma
            let clock = rest
                .trim_start_matches('s')
                .trim_start_matches(',')
                .trim();
            (days, clock)
        }
        None => (0, text),
    };

    let mut parts = clock.split(':');
    let hours: i64 = parts.next()?.trim().parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (whole, millis) = match seconds_part.split_once('.') {
        Some((whole, frac)) => {
            let whole: i64 = whole.parse().ok()?;
            // Truncate the fraction to milliseconds.
            let frac = &frac[..frac.len().min(3)];
            let scale = 10_i64.pow(3 - frac.len() as u32);
            let millis: i64 = frac.parse().ok()?;
            (whole, millis * scale)
        }
        None => (seconds_part.parse().ok()?, 0),
    };

    if minutes >= 60 || whole >= 60 || minutes < 0 || whole < 0 || hours < 0 || days < 0 {
        return None;
    }

    let total_seconds = days * 86_400 + hours * 3_600 + minutes * 60 + whole;
    Some(TimeDelta::seconds(total_seconds) + TimeDelta::milliseconds(millis))
}
