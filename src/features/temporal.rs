//! Calendar features derived from the purchase timestamp.
//!
//! Works on the stored local calendar fields; no timezone conversion.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Purchase hour, 0-23.
pub fn hour_of_day(ts: NaiveDateTime) -> u32 {
    ts.hour()
}

/// Purchase weekday, Monday = 0 .. Sunday = 6.
pub fn day_of_week(ts: NaiveDateTime) -> u32 {
    ts.weekday().num_days_from_monday()
}
