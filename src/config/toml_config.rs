use crate::calendar::BusinessCalendar;
use crate::domain::model::TicketKind;
use crate::domain::ports::{ConfigProvider, TeamDirectory};
use crate::sla::SlaTargets;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

const VALID_FORMATS: [&str; 2] = ["csv", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report tickets flagged for exclusion as well.
    #[serde(default)]
    pub include_excluded: bool,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub teams: TeamConfig,
    #[serde(default)]
    pub targets: SlaTargets,
    pub inputs: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Public holidays as `YYYY-MM-DD`.
    #[serde(default)]
    pub holidays: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamConfig {
    /// People whose SLAs are being measured.
    #[serde(default)]
    pub support: Vec<String>,
    /// People whose updates never count as a touch (e.g. managers).
    #[serde(default)]
    pub ignored: Vec<String>,
}

impl TeamDirectory for TeamConfig {
    fn is_team_member(&self, name: &str) -> bool {
        self.support.iter().any(|member| member == name)
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|person| person == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_base_path")]
    pub base_path: String,
    pub incidents: Option<String>,
    pub incident_slas: Option<String>,
    pub requests: Option<String>,
    pub overrides: Option<String>,
}

impl InputConfig {
    fn default_base_path() -> String {
        ".".to_string()
    }

    fn files(&self) -> Vec<&str> {
        [&self.incidents, &self.incident_slas, &self.requests, &self.overrides]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_path")]
    pub path: String,
    #[serde(default = "OutputConfig::default_formats")]
    pub formats: Vec<String>,
    /// Also write every report file into `sla_report.zip`.
    #[serde(default)]
    pub bundle: bool,
}

impl OutputConfig {
    fn default_path() -> String {
        "./output".to_string()
    }

    fn default_formats() -> Vec<String> {
        VALID_FORMATS.iter().map(|f| f.to_string()).collect()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            formats: Self::default_formats(),
            bundle: false,
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

impl ReportConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        tracing::debug!("Loaded configuration from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("output.path", &self.output.path)?;
        validate_path("inputs.base_path", &self.inputs.base_path)?;

        if self.inputs.incidents.is_none() && self.inputs.requests.is_none() {
            return Err(ReportError::MissingConfigError {
                field: "inputs.incidents".to_string(),
            });
        }
        if self.inputs.incidents.is_some() {
            validate_required_field("inputs.incident_slas", &self.inputs.incident_slas)?;
        }
        validate_file_extensions("inputs", &self.inputs.files(), &["csv"])?;

        for format in &self.output.formats {
            if !VALID_FORMATS.contains(&format.as_str()) {
                return Err(ReportError::InvalidConfigValueError {
                    field: "output.formats".to_string(),
                    value: format.clone(),
                    reason: format!("Unsupported format. Valid formats: {}", VALID_FORMATS.join(", ")),
                });
            }
        }

        for name in self.teams.support.iter().chain(&self.teams.ignored) {
            validate_non_empty_string("teams", name)?;
        }
        if self.teams.support.is_empty() {
            tracing::warn!("No support team members configured; every update counts as another team");
        }

        self.targets.validate()?;
        self.calendar()?;
        Ok(())
    }

    pub fn calendar(&self) -> Result<BusinessCalendar> {
        BusinessCalendar::from_date_strings(&self.calendar.holidays)
    }

    /// Drops the inputs of the kind that is not being reported.
    pub fn restrict_to(&mut self, kind: Option<TicketKind>) {
        match kind {
            Some(TicketKind::Incident) => self.inputs.requests = None,
            Some(TicketKind::Request) => {
                self.inputs.incidents = None;
                self.inputs.incident_slas = None;
            }
            None => {}
        }
    }
}

impl ConfigProvider for ReportConfig {
    fn input_base_path(&self) -> &str {
        &self.inputs.base_path
    }

    fn incidents_file(&self) -> Option<&str> {
        self.inputs.incidents.as_deref()
    }

    fn incident_slas_file(&self) -> Option<&str> {
        self.inputs.incident_slas.as_deref()
    }

    fn requests_file(&self) -> Option<&str> {
        self.inputs.requests.as_deref()
    }

    fn overrides_file(&self) -> Option<&str> {
        self.inputs.overrides.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn bundle_output(&self) -> bool {
        self.output.bundle
    }

    fn include_excluded(&self) -> bool {
        self.include_excluded
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
