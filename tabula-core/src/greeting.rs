//! Time-of-day greeting for the dashboard header.

use chrono::{Local, Timelike};

/// The message bucket for a given hour of the day.
///
/// Buckets:
/// - 0..6   "It's too late, take some sleep"
/// - 6..9   "You're up early"
/// - 9..12  "Have a good day ahead"
/// - 12..17 "Good Afternoon"
/// - 17..20 "Good Evening"
/// - 20..24 "It's time to wrap up for the day"
pub fn message_for_hour(hour: u32) -> &'static str {
    match hour {
        0..=5 => "It's too late, take some sleep",
        6..=8 => "You're up early",
        9..=11 => "Have a good day ahead",
        12..=16 => "Good Afternoon",
        17..=19 => "Good Evening",
        _ => "It's time to wrap up for the day",
    }
}

/// Compose the greeting line. A non-empty custom message wins outright;
/// otherwise the time-of-day bucket is addressed to the user.
pub fn compose(user: &str, custom: Option<&str>, hour: u32) -> String {
    if let Some(message) = custom {
        if !message.is_empty() {
            return message.to_string();
        }
    }
    format!("Hey {user}, {}!", message_for_hour(hour))
}

/// Greeting for the current local time.
pub fn now(user: &str, custom: Option<&str>) -> String {
    compose(user, custom, Local::now().hour())
}
