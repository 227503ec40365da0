use crate::calendar::{
    minutes_of_day, BusinessCalendar, BusinessDuration, BUSINESS_DAY_MINUTES, BUSINESS_END_MINUTES,
    BUSINESS_START_MINUTES, TIMESTAMP_FORMAT,
};
use crate::utils::error::{ReportError, Result};
use chrono::{NaiveDateTime, TimeDelta};

impl BusinessCalendar {
    /// Business time between two instants, in 11-hour business days.
    ///
    /// Time before 07:00, after 18:00, on weekends and on holidays does not
    /// count. Returns [`ReportError::InvalidRange`] when `end` precedes `start`.
    pub fn elapsed(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<BusinessDuration> {
        if end < start {
            return Err(ReportError::InvalidRange {
                start: start.format(TIMESTAMP_FORMAT).to_string(),
                end: end.format(TIMESTAMP_FORMAT).to_string(),
            });
        }

        let minutes = self.business_minutes(start, end);
        Ok(BusinessDuration::from_business_minutes(minutes as u64))
    }

    fn business_minutes(&self, start: NaiveDateTime, end: NaiveDateTime) -> i64 {
        let start_minutes = minutes_of_day(&start);
        let end_minutes = minutes_of_day(&end);

        if start.date() == end.date() {
            if !self.is_business_day(start.date()) {
                return 0;
            }
            let from = start_minutes.max(BUSINESS_START_MINUTES);
            let to = end_minutes.min(BUSINESS_END_MINUTES);
            return (to - from).max(0);
        }

        let mut total = 0;

        if self.is_business_day(start.date()) {
            total += (BUSINESS_END_MINUTES - start_minutes.max(BUSINESS_START_MINUTES)).max(0);
        }

        let mut day = start.date() + TimeDelta::days(1);
        while day < end.date() {
            if self.is_business_day(day) {
                total += BUSINESS_DAY_MINUTES;
            }
            day += TimeDelta::days(1);
        }

        if self.is_business_day(end.date()) {
            total += (end_minutes.min(BUSINESS_END_MINUTES) - BUSINESS_START_MINUTES).max(0);
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use crate::calendar::test_support::{calendar_2024, ts};
    use crate::calendar::BusinessDuration;
    use crate::utils::error::ReportError;

    fn elapsed(start: &str, end: &str) -> BusinessDuration {
        calendar_2024().elapsed(ts(start), ts(end)).unwrap()
    }

    #[test]
    fn test_same_instant_is_zero() {
        assert!(elapsed("2024-07-01 10:00:00", "2024-07-01 10:00:00").is_zero());
        assert!(elapsed("2024-07-06 10:00:00", "2024-07-06 10:00:00").is_zero());
    }

    #[test]
    fn test_full_business_day() {
        assert_eq!(elapsed("2024-07-01 07:00:00", "2024-07-01 18:00:00"), BusinessDuration::new(0, 11, 0));
    }

    #[test]
    fn test_same_day_outside_window() {
        assert!(elapsed("2024-07-01 05:00:00", "2024-07-01 06:00:00").is_zero());
        assert!(elapsed("2024-07-01 18:30:00", "2024-07-01 23:00:00").is_zero());
        assert_eq!(elapsed("2024-07-01 06:00:00", "2024-07-01 08:30:00"), BusinessDuration::new(0, 1, 30));
    }

    #[test]
    fn test_non_business_day_counts_nothing() {
        assert!(elapsed("2024-07-06 09:00:00", "2024-07-06 12:00:00").is_zero());
        assert!(elapsed("2024-08-05 09:00:00", "2024-08-05 12:00:00").is_zero());
    }

    #[test]
    fn test_across_weekend() {
        assert_eq!(elapsed("2024-07-05 16:00:00", "2024-07-08 09:00:00"), BusinessDuration::new(0, 4, 0));
    }

    #[test]
    fn test_across_weekend_and_holiday() {
        assert_eq!(elapsed("2024-08-02 16:00:00", "2024-08-06 08:00:00"), BusinessDuration::new(0, 3, 0));
    }

    #[test]
    fn test_overnight_outside_window() {
        assert!(elapsed("2024-07-01 19:00:00", "2024-07-02 06:00:00").is_zero());
        assert_eq!(elapsed("2024-07-01 17:00:00", "2024-07-02 07:01:00"), BusinessDuration::new(0, 1, 1));
    }

    #[test]
    fn test_multi_day_normalizes_to_business_days() {
        assert_eq!(elapsed("2024-07-01 07:00:00", "2024-07-02 07:00:00"), BusinessDuration::new(0, 11, 0));
        assert_eq!(elapsed("2024-07-01 07:00:00", "2024-07-03 07:00:00"), BusinessDuration::new(1, 11, 0));
        assert_eq!(elapsed("2024-07-01 09:15:00", "2024-07-03 10:40:00"), BusinessDuration::new(2, 1, 25));
        assert_eq!(elapsed("2024-07-01 08:00:00", "2024-07-15 17:30:00"), BusinessDuration::new(10, 9, 30));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let err = calendar_2024()
            .elapsed(ts("2024-07-02 09:00:00"), ts("2024-07-01 09:00:00"))
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));

        let err = calendar_2024()
            .elapsed(ts("2024-07-01 09:00:01"), ts("2024-07-01 09:00:00"))
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
    }

    #[test]
    fn test_round_trip_with_advance() {
        let calendar = calendar_2024();
        let start = ts("2024-07-01 07:00:00");

        for target in ["0:04:00", "0:10:30", "1:00:00", "5:00:00", "20:00:00"] {
            let duration: BusinessDuration = target.parse().unwrap();
            let end = calendar.advance(start, &duration);
            let measured = calendar.elapsed(start, end).unwrap();
            assert_eq!(measured.total_minutes(), duration.total_minutes(), "target {}", target);
        }
    }

    #[test]
    fn test_round_trip_within_a_day() {
        let calendar = calendar_2024();
        let start = ts("2024-07-03 09:20:00");
        let duration: BusinessDuration = "0:04:15".parse().unwrap();
        let end = calendar.advance(start, &duration);
        assert_eq!(calendar.elapsed(start, end).unwrap(), duration);
    }
}
