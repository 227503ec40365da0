use crate::calendar::{
    minutes_of_day, BusinessCalendar, BusinessDuration, BUSINESS_DAY_MINUTES, BUSINESS_END_MINUTES,
    BUSINESS_START_MINUTES,
};
use chrono::{NaiveDateTime, TimeDelta};

/// Hours added on top of the opening time when the hour/minute part of a
/// target wraps past midnight.
// FIXME: this only lands correctly for a narrow set of inputs (e.g. 17:00 plus
// ten hours ends at 16:00 the next day). Kept as is so breach times match
// reports already issued.
const WRAP_COMPENSATION_HOURS: i64 = 6;

impl BusinessCalendar {
    /// Returns the instant reached after `duration` of business time has
    /// passed from `start`.
    ///
    /// A start on a weekend or holiday is moved to 07:00 on the next business
    /// day first. Starts before opening count from 07:00, starts after closing
    /// count from 07:00 on the next business day.
    pub fn advance(&self, start: NaiveDateTime, duration: &BusinessDuration) -> NaiveDateTime {
        let mut days = duration.days as u64;
        let mut start = start;

        if !self.is_business_day(start.date()) {
            while !self.is_business_day(start.date()) {
                start += TimeDelta::days(1);
            }
            start -= TimeDelta::minutes(minutes_of_day(&start) - BUSINESS_START_MINUTES);
        }

        let mut end = start;
        let start_minutes = minutes_of_day(&start);

        if start_minutes < BUSINESS_START_MINUTES {
            end += TimeDelta::minutes(BUSINESS_START_MINUTES - start_minutes);
        }

        if start_minutes > BUSINESS_END_MINUTES {
            days += 1;
            end -= TimeDelta::minutes(start_minutes - BUSINESS_START_MINUTES);
        }

        end += TimeDelta::hours(duration.hours as i64) + TimeDelta::minutes(duration.minutes as i64);

        if minutes_of_day(&end) < BUSINESS_START_MINUTES {
            end += TimeDelta::minutes(BUSINESS_START_MINUTES) + TimeDelta::hours(WRAP_COMPENSATION_HOURS);
        }

        if minutes_of_day(&end) > BUSINESS_END_MINUTES {
            days += 1;
            end -= TimeDelta::minutes(BUSINESS_DAY_MINUTES);
        }

        while days > 0 {
            end += TimeDelta::days(1);
            if self.is_business_day(end.date()) {
                days -= 1;
            }
        }

        end
    }
}
