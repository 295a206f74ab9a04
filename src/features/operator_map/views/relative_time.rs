//! Humanized "time ago" strings for the detail panel

use chrono::{DateTime, Utc};

const SECONDS_THRESHOLD: f64 = 45.0;
const MINUTES_THRESHOLD: f64 = 45.0;
const HOURS_THRESHOLD: f64 = 22.0;
const DAYS_THRESHOLD: f64 = 26.0;
const MONTHS_THRESHOLD: f64 = 11.0;

/// Average Gregorian month length in days
const DAYS_PER_MONTH: f64 = 146_097.0 / 4_800.0;

/// `then` relative to `now`, e.g. "a few seconds ago", "3 hours ago", "in a day"
pub fn humanize(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let millis = (now - then).num_milliseconds();
    let phrase = phrase(millis.unsigned_abs() as f64 / 1000.0);

    if millis < 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

fn phrase(total_seconds: f64) -> String {
    let seconds = total_seconds.round();
    let minutes = (total_seconds / 60.0).round();
    let hours = (total_seconds / 3_600.0).round();
    let days = (total_seconds / 86_400.0).round();
    let months = (total_seconds / 86_400.0 / DAYS_PER_MONTH).round();
    let years = (total_seconds / 86_400.0 / DAYS_PER_MONTH / 12.0).round();

    if seconds < SECONDS_THRESHOLD {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < MINUTES_THRESHOLD {
        format!("{} minutes", minutes)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < HOURS_THRESHOLD {
        format!("{} hours", hours)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < DAYS_THRESHOLD {
        format!("{} days", days)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < MONTHS_THRESHOLD {
        format!("{} months", months)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years)
    }
}
