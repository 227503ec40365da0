use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

use crate::calendar::TIMESTAMP_FORMAT;

struct ExportDateFormat {
    pattern: Regex,
    format: &'static str,
    max_len: usize,
}

fn export_date_formats() -> &'static [ExportDateFormat] {
    static FORMATS: OnceLock<Vec<ExportDateFormat>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        vec![
            // 25-04-2024 13:05:00, as written by the report export
            ExportDateFormat {
                pattern: Regex::new(
                    r"^(0[1-9]|[12][0-9]|3[01])-(0[1-9]|1[0-2])-(\d{4})\s([01][0-9]|2[0-3]):([0-5][0-9]):([0-5][0-9])$",
                )
                .expect("export date pattern is valid"),
                format: "%d-%m-%Y %H:%M:%S",
                max_len: 19,
            },
            // 25/4/2024 13:05, as re-saved by a spreadsheet
            ExportDateFormat {
                pattern: Regex::new(
                    r"^([1-9]|[12][0-9]|3[01])/([1-9]|1[0-2])/(\d{4})\s([0-9]|1[0-9]|2[0-3]):([0-5][0-9])$",
                )
                .expect("spreadsheet date pattern is valid"),
                format: "%d/%m/%Y %H:%M",
                max_len: 16,
            },
        ]
    })
}

/// Rewrites export timestamps into `YYYY-MM-DD HH:MM:SS`; any other value is
/// returned unchanged.
pub fn convert_field(value: &str) -> String {
    for candidate in export_date_formats() {
        if value.len() <= candidate.max_len && candidate.pattern.is_match(value) {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(value, candidate.format) {
                return parsed.format(TIMESTAMP_FORMAT).to_string();
            }
        }
    }
    value.to_string()
}

/// Interprets the yes/no style flags found in exports.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
