//! Business-time arithmetic over a fixed 07:00–18:00, Monday to Friday window.
//!
//! All instants are naive wall-clock timestamps. Time-of-day checks look at
//! hours and minutes only; seconds ride along unchanged.

pub mod advance;
pub mod duration;
pub mod elapsed;

pub use duration::{subtract_duration, BusinessDuration};

use crate::utils::error::{ReportError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use std::collections::BTreeSet;

/// Opening time, in minutes after midnight.
pub const BUSINESS_START_MINUTES: i64 = 7 * 60;
/// Closing time, in minutes after midnight.
pub const BUSINESS_END_MINUTES: i64 = 18 * 60;
/// Length of one business day.
pub const BUSINESS_DAY_MINUTES: i64 = BUSINESS_END_MINUTES - BUSINESS_START_MINUTES;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Working-day calendar: weekdays minus a fixed holiday set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl BusinessCalendar {
    pub fn new<I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Builds a calendar from `YYYY-MM-DD` strings.
    pub fn from_date_strings<S: AsRef<str>>(dates: &[S]) -> Result<Self> {
        let holidays = dates
            .iter()
            .map(|d| {
                NaiveDate::parse_from_str(d.as_ref().trim(), DATE_FORMAT).map_err(|_| {
                    ReportError::InvalidConfigValueError {
                        field: "calendar.holidays".to_string(),
                        value: d.as_ref().to_string(),
                        reason: "Holiday dates must be written as YYYY-MM-DD".to_string(),
                    }
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;

        tracing::debug!("Business calendar loaded with {} holidays", holidays.len());
        Ok(Self { holidays })
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}

pub(crate) fn minutes_of_day(instant: &NaiveDateTime) -> i64 {
    instant.hour() as i64 * 60 + instant.minute() as i64
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|_| ReportError::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// Parses an optional export cell; blank cells are `None`.
pub fn parse_optional_timestamp(value: &str) -> Result<Option<NaiveDateTime>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_timestamp(value).map(Some)
    }
}
