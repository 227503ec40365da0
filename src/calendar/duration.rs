use crate::calendar::BUSINESS_DAY_MINUTES;
use crate::utils::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A span of business time where one day is a full 07:00–18:00 window.
///
/// Values produced by [`BusinessCalendar::elapsed`](crate::BusinessCalendar::elapsed)
/// keep `hours` within `0..=11`; values parsed from SLA targets are taken as
/// written (`0:11:00` and `20:00:00` are both valid targets).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BusinessDuration {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl BusinessDuration {
    pub const ZERO: BusinessDuration = BusinessDuration::new(0, 0, 0);

    pub const fn new(days: u32, hours: u32, minutes: u32) -> Self {
        Self {
            days,
            hours,
            minutes,
        }
    }

    /// Splits a count of business minutes into 11-hour days.
    ///
    /// The remainder is allowed to reach a full 11 hours, so exactly one
    /// business day of minutes is reported as `0:11:00`, not `1:00:00`.
    pub fn from_business_minutes(total: u64) -> Self {
        let day = BUSINESS_DAY_MINUTES as u64;
        let days = if total > day { (total - 1) / day } else { 0 };
        let remainder = total - days * day;

        Self {
            days: days as u32,
            hours: (remainder / 60) as u32,
            minutes: (remainder % 60) as u32,
        }
    }

    pub fn total_minutes(&self) -> u64 {
        self.days as u64 * BUSINESS_DAY_MINUTES as u64 + self.hours as u64 * 60 + self.minutes as u64
    }

    pub fn is_zero(&self) -> bool {
        self.total_minutes() == 0
    }

    /// Compact `D:HH:MM` form used in configuration files.
    pub fn to_target_string(&self) -> String {
        format!("{}:{:02}:{:02}", self.days, self.hours, self.minutes)
    }
}

/// Removes `part` from `total`, borrowing 60 minutes per hour and 11 hours
/// per business day.
///
/// Fails with [`ReportError::NegativeDuration`] when `part` is longer than
/// `total`.
pub fn subtract_duration(total: BusinessDuration, part: BusinessDuration) -> Result<BusinessDuration> {
    let (mut days, mut hours, mut minutes) = (total.days as i64, total.hours as i64, total.minutes as i64);
    let (part_days, part_hours, part_minutes) = (part.days as i64, part.hours as i64, part.minutes as i64);

    if minutes < part_minutes {
        minutes += 60;
        hours -= 1;
    }

    if hours < part_hours {
        hours += BUSINESS_DAY_MINUTES / 60;
        days -= 1;
    }

    let (days, hours, minutes) = (days - part_days, hours - part_hours, minutes - part_minutes);
    if days < 0 || hours < 0 || minutes < 0 {
        return Err(ReportError::NegativeDuration {
            total: total.to_target_string(),
            part: part.to_target_string(),
        });
    }

    Ok(BusinessDuration::new(days as u32, hours as u32, minutes as u32))
}

impl FromStr for BusinessDuration {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || ReportError::MalformedDuration {
            input: s.to_string(),
        };

        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(malformed());
        }

        let mut values = [0u32; 3];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.trim().parse().map_err(|_| malformed())?;
        }

        Ok(BusinessDuration::new(values[0], values[1], values[2]))
    }
}

impl TryFrom<String> for BusinessDuration {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BusinessDuration> for String {
    fn from(value: BusinessDuration) -> Self {
        value.to_target_string()
    }
}

/// Report form, days right-aligned to two columns: `" 1:04:30"`.
impl fmt::Display for BusinessDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:2}:{:02}:{:02}", self.days, self.hours, self.minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let d: BusinessDuration = "5:00:00".parse().unwrap();
        assert_eq!(d, BusinessDuration::new(5, 0, 0));

        let d: BusinessDuration = "0:11:00".parse().unwrap();
        assert_eq!(d, BusinessDuration::new(0, 11, 0));

        let d: BusinessDuration = " 260:00:00 ".parse().unwrap();
        assert_eq!(d.days, 260);
    }

    #[test]
    fn test_parse_malformed_duration() {
        for input in ["", "4:00", "1:2:3:4", "a:00:10", "0:-1:00", "0::10"] {
            let err = input.parse::<BusinessDuration>().unwrap_err();
            assert!(
                matches!(err, ReportError::MalformedDuration { .. }),
                "expected malformed for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_display_matches_report_layout() {
        assert_eq!(BusinessDuration::new(0, 4, 5).to_string(), " 0:04:05");
        assert_eq!(BusinessDuration::new(12, 10, 59).to_string(), "12:10:59");
        assert_eq!(BusinessDuration::new(1, 0, 30).to_target_string(), "1:00:30");
    }

    #[test]
    fn test_from_business_minutes_keeps_full_day_as_hours() {
        assert_eq!(BusinessDuration::from_business_minutes(0), BusinessDuration::ZERO);
        assert_eq!(BusinessDuration::from_business_minutes(660), BusinessDuration::new(0, 11, 0));
        assert_eq!(BusinessDuration::from_business_minutes(661), BusinessDuration::new(1, 0, 1));
        assert_eq!(BusinessDuration::from_business_minutes(1320), BusinessDuration::new(1, 11, 0));
        assert_eq!(BusinessDuration::from_business_minutes(1405), BusinessDuration::new(2, 1, 25));
    }

    #[test]
    fn test_subtract_borrows_minutes() {
        let result = subtract_duration(BusinessDuration::new(1, 2, 30), BusinessDuration::new(0, 1, 45)).unwrap();
        assert_eq!(result, BusinessDuration::new(1, 0, 45));
        assert_eq!(result.total_minutes(), 810 - 105);
    }

    #[test]
    fn test_subtract_borrows_minutes_and_business_hours() {
        let result = subtract_duration(BusinessDuration::new(1, 0, 30), BusinessDuration::new(0, 1, 45)).unwrap();
        assert_eq!(result, BusinessDuration::new(0, 9, 45));

        let result = subtract_duration(BusinessDuration::new(2, 5, 0), BusinessDuration::new(0, 3, 20)).unwrap();
        assert_eq!(result, BusinessDuration::new(2, 1, 40));
    }

    #[test]
    fn test_subtract_rejects_negative_result() {
        let err = subtract_duration(BusinessDuration::new(0, 1, 0), BusinessDuration::new(0, 2, 0)).unwrap_err();
        assert!(matches!(err, ReportError::NegativeDuration { .. }));

        let err = subtract_duration(BusinessDuration::ZERO, BusinessDuration::new(0, 0, 1)).unwrap_err();
        assert!(matches!(err, ReportError::NegativeDuration { .. }));
    }

    #[test]
    fn test_serde_uses_target_string() {
        #[derive(Deserialize, Serialize)]
        struct Wrapper {
            target: BusinessDuration,
        }

        let parsed: Wrapper = toml::from_str(r#"target = "0:04:00""#).unwrap();
        assert_eq!(parsed.target, BusinessDuration::new(0, 4, 0));

        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, r#"{"target":"0:04:00"}"#);
    }
}
