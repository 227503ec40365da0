use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid time range: end {end} is before start {start}")]
    InvalidRange { start: String, end: String },

    #[error("Malformed duration '{input}': expected D:HH:MM")]
    MalformedDuration { input: String },

    #[error("Negative duration: cannot subtract {part} from {total}")]
    NegativeDuration { total: String, part: String },

    #[error("Invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Calculation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ZipError(_) | ReportError::IoError(_) => ErrorCategory::Io,
            ReportError::CsvError(_)
            | ReportError::SerializationError(_)
            | ReportError::ProcessingError { .. }
            | ReportError::ValidationError { .. }
            | ReportError::InvalidTimestamp { .. } => ErrorCategory::Data,
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::InvalidRange { .. }
            | ReportError::MalformedDuration { .. }
            | ReportError::NegativeDuration { .. } => ErrorCategory::Calculation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Configuration | ErrorCategory::Calculation => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReportError::ZipError(_) => "Check that the output directory is writable",
            ReportError::IoError(_) => "Check that the input files exist and are readable",
            ReportError::CsvError(_) => "Re-export the file as comma separated values with a header row",
            ReportError::SerializationError(_) => "Report the ticket data that triggered the failure",
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => {
                "Review the configuration file against the documented layout"
            }
            ReportError::ProcessingError { .. } | ReportError::ValidationError { .. } => {
                "Check the export contains the expected columns"
            }
            ReportError::InvalidRange { .. } => "Make sure the stop time is after the start time",
            ReportError::MalformedDuration { .. } => "Write durations as days:hours:minutes, e.g. 0:04:00",
            ReportError::NegativeDuration { .. } => {
                "The excluded interval is longer than the total, check the transfer times"
            }
            ReportError::InvalidTimestamp { .. } => "Write timestamps as YYYY-MM-DD HH:MM:SS",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write a file: {}", self),
            ErrorCategory::Data => format!("The export data could not be processed: {}", self),
            ErrorCategory::Configuration => format!("The configuration is invalid: {}", self),
            ErrorCategory::Calculation => format!("Business time calculation failed: {}", self),
        }
    }
}

impl From<toml::de::Error> for ReportError {
    fn from(e: toml::de::Error) -> Self {
        ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculation_errors_are_high_severity() {
        let err = ReportError::InvalidRange {
            start: "2024-07-01 10:00:00".to_string(),
            end: "2024-07-01 09:00:00".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Calculation);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("Business time"));
    }

    #[test]
    fn test_bad_export_data_is_medium_severity() {
        let err = ReportError::ValidationError {
            message: "line 3: 'opened' is empty".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = ReportError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
