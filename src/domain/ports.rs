use crate::domain::model::{ExportSet, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use crate::utils::error::ReportError;
use crate::utils::validation::validate_range;
use chrono::{Datelike, NaiveDate, NaiveDateTime};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Decides who counts as the support team when reading ticket updates.
pub trait TeamDirectory: Send + Sync {
    /// Member of the team whose SLAs are being measured.
    fn is_team_member(&self, name: &str) -> bool;
    /// Updates from these people neither start nor stop any clock.
    fn is_ignored(&self, name: &str) -> bool;
}

/// The reporting window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReportPeriod {
    /// The calendar month from 00:00:00 on the 1st to 23:59:59 on its last day.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        validate_range("month", month, 1, 12)?;
        let invalid = || ReportError::InvalidConfigValueError {
            field: "year".to_string(),
            value: year.to_string(),
            reason: "Year is out of range".to_string(),
        };

        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let last = next.pred_opt().ok_or_else(invalid)?;

        Ok(Self {
            start: first.and_hms_opt(0, 0, 0).ok_or_else(invalid)?,
            end: last.and_hms_opt(23, 59, 59).ok_or_else(invalid)?,
        })
    }

    pub fn label(&self) -> String {
        format!("{}-{:02}", self.start.year(), self.start.month())
    }
}

pub trait ConfigProvider: Send + Sync {
    /// Directory the input file names are relative to.
    fn input_base_path(&self) -> &str;
    fn incidents_file(&self) -> Option<&str>;
    fn incident_slas_file(&self) -> Option<&str>;
    fn requests_file(&self) -> Option<&str>;
    fn overrides_file(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn bundle_output(&self) -> bool;
    fn include_excluded(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExportSet>;
    async fn transform(&self, data: ExportSet) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::test_support::ts;

    #[test]
    fn test_month_period() {
        let period = ReportPeriod::month(2024, 2).unwrap();
        assert_eq!(period.start, ts("2024-02-01 00:00:00"));
        assert_eq!(period.end, ts("2024-02-29 23:59:59"));
        assert_eq!(period.label(), "2024-02");

        let december = ReportPeriod::month(2024, 12).unwrap();
        assert_eq!(december.end, ts("2024-12-31 23:59:59"));
    }

    #[test]
    fn test_invalid_month() {
        assert!(ReportPeriod::month(2024, 0).is_err());
        assert!(ReportPeriod::month(2024, 13).is_err());
    }
}
