//! Expiry selection and the display-only lifecycle checks built on it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MINUTE_MILLIS: i64 = 60 * 1000;
const HOUR_MILLIS: i64 = 60 * MINUTE_MILLIS;
const DAY_MILLIS: i64 = 24 * HOUR_MILLIS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpirySelection {
    #[serde(rename = "10 minutes")]
    TenMinutes,
    #[serde(rename = "30 minutes")]
    ThirtyMinutes,
    #[serde(rename = "1 hour")]
    OneHour,
    #[serde(rename = "6 hours")]
    SixHours,
    #[serde(rename = "1 day")]
    OneDay,
    #[serde(rename = "1 week")]
    OneWeek,
    #[default]
    #[serde(rename = "never", alias = "Never")]
    Never,
}

impl ExpirySelection {
    pub const ALL: [ExpirySelection; 7] = [
        ExpirySelection::TenMinutes,
        ExpirySelection::ThirtyMinutes,
        ExpirySelection::OneHour,
        ExpirySelection::SixHours,
        ExpirySelection::OneDay,
        ExpirySelection::OneWeek,
        ExpirySelection::Never,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExpirySelection::TenMinutes => "10 minutes",
            ExpirySelection::ThirtyMinutes => "30 minutes",
            ExpirySelection::OneHour => "1 hour",
            ExpirySelection::SixHours => "6 hours",
            ExpirySelection::OneDay => "1 day",
            ExpirySelection::OneWeek => "1 week",
            ExpirySelection::Never => "never",
        }
    }

    pub fn duration(self) -> Option<Duration> {
        match self {
            ExpirySelection::TenMinutes => Some(Duration::minutes(10)),
            ExpirySelection::ThirtyMinutes => Some(Duration::minutes(30)),
            ExpirySelection::OneHour => Some(Duration::hours(1)),
            ExpirySelection::SixHours => Some(Duration::hours(6)),
            ExpirySelection::OneDay => Some(Duration::days(1)),
            ExpirySelection::OneWeek => Some(Duration::weeks(1)),
            ExpirySelection::Never => None,
        }
    }
}

impl fmt::Display for ExpirySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpirySelection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ExpirySelection::ALL
            .into_iter()
            .find(|selection| selection.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("Unknown expiry selection: {value}"))
    }
}

pub fn resolve(selection: ExpirySelection, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    selection.duration().map(|duration| now + duration)
}

pub fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    matches!(expires_at, Some(expires_at) if now > expires_at)
}

/// Human readable countdown, e.g. `2d 3h remaining` or `45m remaining`.
pub fn time_remaining(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(expires_at) = expires_at else {
        return "Never expires".into();
    };
    let remaining = (expires_at - now).num_milliseconds();
    if remaining <= 0 {
        return "Expired".into();
    }
    let days = remaining / DAY_MILLIS;
    let hours = (remaining % DAY_MILLIS) / HOUR_MILLIS;
    let minutes = (remaining % HOUR_MILLIS) / MINUTE_MILLIS;
    if days > 0 {
        format!("{days}d {hours}h remaining")
    } else if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else {
        format!("{minutes}m remaining")
    }
}

/// Label used in history listings, e.g. `Jan 1, 2024, 12:00 AM`.
pub fn format_created_at(created_at: DateTime<Utc>) -> String {
    created_at.format("%b %-d, %Y, %I:%M %p").to_string()
}
