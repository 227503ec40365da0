pub mod cli;
pub mod toml_config;

pub use toml_config::{ReportConfig, TeamConfig};

#[cfg(feature = "cli")]
pub use args::{load_calendar, CliConfig, Command, ReportArgs, ReportKind};

#[cfg(feature = "cli")]
mod args {
    use super::ReportConfig;
    use crate::calendar::BusinessCalendar;
    use crate::domain::model::TicketKind;
    use crate::domain::ports::ReportPeriod;
    use crate::utils::error::{ReportError, Result};
    use crate::utils::validation::{validate_range, Validate};
    use chrono::{Datelike, NaiveDate};
    use clap::{Parser, Subcommand, ValueEnum};
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "sla-report")]
    #[command(about = "Business-hours SLA reporting for incidents and requests")]
    pub struct CliConfig {
        #[arg(long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Write logs as JSON lines")]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Evaluate the SLAs of one reporting month.
        Report(ReportArgs),
        /// Print the instant a business duration after a start time.
        Advance {
            /// Start, `YYYY-MM-DD HH:MM:SS`.
            timestamp: String,
            /// Business duration, `D:HH:MM`.
            duration: String,
            /// Configuration file providing the holiday list.
            #[arg(long)]
            config: Option<PathBuf>,
        },
        /// Print the business time between two instants.
        Elapsed {
            start: String,
            end: String,
            #[arg(long)]
            config: Option<PathBuf>,
        },
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    pub enum ReportKind {
        Incident,
        Request,
        All,
    }

    impl ReportKind {
        pub fn ticket_kind(&self) -> Option<TicketKind> {
            match self {
                ReportKind::Incident => Some(TicketKind::Incident),
                ReportKind::Request => Some(TicketKind::Request),
                ReportKind::All => None,
            }
        }
    }

    #[derive(Debug, Clone, clap::Args)]
    pub struct ReportArgs {
        #[arg(long)]
        pub config: PathBuf,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        pub month: u32,

        /// Defaults to the most recent year in which `month` has started.
        #[arg(long)]
        pub year: Option<i32>,

        #[arg(long, value_enum, default_value_t = ReportKind::All)]
        pub kind: ReportKind,

        #[arg(long, help = "Report tickets flagged for exclusion as well")]
        pub include_excluded: bool,

        #[arg(long)]
        pub output_path: Option<String>,

        #[arg(long, help = "Also bundle the report files into a zip archive")]
        pub bundle: bool,
    }

    impl ReportArgs {
        pub fn period(&self, today: NaiveDate) -> Result<ReportPeriod> {
            let year = match self.year {
                Some(year) => year,
                None if self.month > today.month() => today.year() - 1,
                None => today.year(),
            };
            ReportPeriod::month(year, self.month)
        }

        /// Loads the configuration file and applies the command line on top.
        pub fn load_config(&self) -> Result<ReportConfig> {
            let mut config = ReportConfig::from_file(existing_file(&self.config)?)?;

            config.include_excluded |= self.include_excluded;
            config.output.bundle |= self.bundle;
            if let Some(path) = &self.output_path {
                config.output.path = path.clone();
            }
            config.restrict_to(self.kind.ticket_kind());

            config.validate()?;
            Ok(config)
        }
    }

    fn existing_file(path: &Path) -> Result<&Path> {
        if !path.is_file() {
            return Err(ReportError::ConfigError {
                message: format!("configuration file {} does not exist", path.display()),
            });
        }
        Ok(path)
    }

    /// Holidays from the configuration file, or weekends only without one.
    pub fn load_calendar(config: Option<&Path>) -> Result<BusinessCalendar> {
        match config {
            Some(path) => ReportConfig::from_file(existing_file(path)?)?.calendar(),
            None => {
                tracing::warn!("No configuration given; only weekends are non-business days");
                Ok(BusinessCalendar::default())
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if let Command::Report(args) = &self.command {
                if let Some(year) = args.year {
                    validate_range("year", year, 1970, 9999)?;
                }
            }
            Ok(())
        }
    }

}
