pub mod adapters;
pub mod calendar;
pub mod config;
pub mod core;
pub mod domain;
pub mod sla;
pub mod utils;

pub use config::{cli::LocalStorage, ReportConfig, TeamConfig};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use calendar::{subtract_duration, BusinessCalendar, BusinessDuration};
pub use core::{etl::ReportEngine, pipeline::SlaPipeline};
pub use domain::ports::ReportPeriod;
pub use sla::{SlaEvaluator, SlaTargets};
pub use utils::error::{ReportError, Result};
