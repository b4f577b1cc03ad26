//! Clock line formatting for the dashboard.
//!
//! Mirrors the start page's date display: `26 Aug, 14:05` in 24-hour mode,
//! `26 Aug, 2:05 PM` in 12-hour mode, with an optional IANA timezone
//! override. Invalid timezone names fall back to local time silently.

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use std::time::Duration;

/// Refresh interval for the clock (and weather) line.
pub const TICK: Duration = Duration::from_secs(30);

/// Format a timestamp the way the dashboard shows it.
pub fn format_at<Z: TimeZone>(at: DateTime<Z>, twelve_hour: bool) -> String
where
    Z::Offset: std::fmt::Display,
{
    let pattern = if twelve_hour {
        "%-d %b, %-I:%M %p"
    } else {
        "%-d %b, %H:%M"
    };
    at.format(pattern).to_string()
}

/// Format the current time, honoring the configured timezone if it parses.
pub fn format_now(time_zone: Option<&str>, twelve_hour: bool) -> String {
    match time_zone.and_then(parse_time_zone) {
        Some(tz) => format_at(Utc::now().with_timezone(&tz), twelve_hour),
        None => format_at(Local::now(), twelve_hour),
    }
}

/// Validate a timezone name. `None` means "use local time".
pub fn parse_time_zone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}
