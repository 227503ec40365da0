use crate::calendar::BusinessDuration;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketKind {
    Incident,
    Request,
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketKind::Incident => write!(f, "Incident"),
            TicketKind::Request => write!(f, "Request"),
        }
    }
}

/// An incident or request as exported from the ticketing system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub kind: TicketKind,
    pub number: String,
    pub service: String,
    pub state: String,
    /// Priority as exported, e.g. `"3 - Moderate"`.
    pub priority: String,
    /// Priority used for reporting; falls back to `priority` when the export
    /// does not carry one.
    pub report_priority: String,
    pub caller: String,
    pub assigned_to: String,
    pub short_description: String,
    pub opened: NaiveDateTime,
    pub resolved: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
    pub comments_and_work_notes: String,
    pub notes: String,
    pub exclude: bool,
}

impl Ticket {
    /// Leading digit of the reporting priority (1 = critical).
    pub fn priority_level(&self) -> Option<u8> {
        leading_priority_digit(&self.report_priority).or_else(|| leading_priority_digit(&self.priority))
    }

    /// Leading digit of the priority the ticket was exported with.
    pub fn exported_priority_level(&self) -> Option<u8> {
        leading_priority_digit(&self.priority)
    }
}

pub(crate) fn leading_priority_digit(value: &str) -> Option<u8> {
    value
        .trim()
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
        .filter(|d| (1..=5).contains(d))
}

/// One SLA measurement recorded against an incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaRecord {
    pub number: String,
    /// Definition name, e.g. `"P2 Response"` or `"P3 Resolution (8h)"`.
    pub definition: String,
    pub stage: String,
    pub start_time: Option<NaiveDateTime>,
    pub stop_time: Option<NaiveDateTime>,
    pub breach_time: Option<NaiveDateTime>,
    pub made_sla: Option<bool>,
}

impl SlaRecord {
    pub fn is_response(&self) -> bool {
        self.definition.ends_with("Response")
    }

    pub fn is_resolution(&self) -> bool {
        self.definition.contains("Resolution")
    }

    /// Priority encoded in the definition name (`"P2 Response"` -> 2).
    pub fn definition_priority(&self) -> Option<u8> {
        self.definition.get(1..).and_then(leading_priority_digit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlaKind {
    Response,
    Resolve,
}

impl FromStr for SlaKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "response" => Ok(SlaKind::Response),
            "resolve" | "resolution" => Ok(SlaKind::Resolve),
            other => Err(format!("unknown SLA kind '{}'", other)),
        }
    }
}

/// A manual correction of the SLA start and/or stop time for a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaOverride {
    pub number: String,
    pub sla: SlaKind,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

/// Everything read from one set of exports.
#[derive(Debug, Clone, Default)]
pub struct ExportSet {
    pub tickets: Vec<Ticket>,
    pub sla_records: Vec<SlaRecord>,
    pub overrides: Vec<SlaOverride>,
}

/// Where a start or stop timestamp was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSource {
    /// Ticket opened time (or resolved time as last resort stop).
    Open,
    /// First update by someone outside the support team.
    Assigned,
    /// First update by the support team.
    Touch,
    /// SLA record matching the ticket priority.
    Sla,
    /// Response SLA recorded under another priority.
    OriginalPriority,
    /// Start of the resolution SLA.
    ResolveStart,
    /// Resolved time from the export.
    Resolved,
    /// Manual override.
    Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlaStatus {
    Met,
    Breached,
    /// Breached, but the ticket spent time with another team.
    Transferred,
    NotApplicable,
}

impl SlaStatus {
    pub fn is_evaluated(&self) -> bool {
        !matches!(self, SlaStatus::NotApplicable)
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlaStatus::Met => "Met",
            SlaStatus::Breached => "Breached",
            SlaStatus::Transferred => "Transferred",
            SlaStatus::NotApplicable => "N/A",
        };
        write!(f, "{}", label)
    }
}

/// Result of measuring one SLA on one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaOutcome {
    pub target: BusinessDuration,
    pub start: Option<NaiveDateTime>,
    pub start_source: Option<TimeSource>,
    pub stop: Option<NaiveDateTime>,
    pub stop_source: Option<TimeSource>,
    pub breach_at: Option<NaiveDateTime>,
    pub duration: Option<BusinessDuration>,
    pub status: SlaStatus,
}

impl SlaOutcome {
    pub fn duration_text(&self) -> String {
        match (&self.duration, self.status.is_evaluated()) {
            (Some(duration), true) => duration.to_string(),
            _ => "N/A".to_string(),
        }
    }
}

/// A period another team held the ticket: last support-team update to the
/// other team's update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEvaluation {
    pub kind: TicketKind,
    pub number: String,
    pub service: String,
    pub priority: u8,
    pub caller: String,
    pub assigned_to: String,
    pub short_description: String,
    pub opened: NaiveDateTime,
    pub response: SlaOutcome,
    pub resolution: SlaOutcome,
    pub transfers: Vec<Transfer>,
    /// Resolution time minus the last transfer, when the ticket was transferred.
    pub team_duration: Option<BusinessDuration>,
    pub notes: String,
}

/// Flat row written to the CSV and JSON reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub kind: TicketKind,
    pub number: String,
    pub priority: u8,
    pub service: String,
    pub description: String,
    pub opened: String,
    pub received: String,
    pub response_target: String,
    pub responded: String,
    pub response_duration: String,
    pub response_status: String,
    pub resolve_target: String,
    pub resolved: String,
    pub resolve_duration: String,
    pub resolve_status: String,
    pub team_duration: String,
    pub transfers: String,
    pub notes: String,
}

/// Per-priority counts of evaluated SLAs (index 0 is P1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub responded: [u32; 5],
    pub resolved: [u32; 5],
    pub response_breaches: [u32; 5],
    pub resolve_breaches: [u32; 5],
}

impl ReportSummary {
    pub fn record(&mut self, evaluation: &TicketEvaluation) {
        let index = match evaluation.priority {
            p @ 1..=5 => (p - 1) as usize,
            _ => return,
        };

        if evaluation.response.status.is_evaluated() {
            self.responded[index] += 1;
        }
        if evaluation.response.status == SlaStatus::Breached {
            self.response_breaches[index] += 1;
        }
        if evaluation.resolution.status.is_evaluated() {
            self.resolved[index] += 1;
        }
        if matches!(
            evaluation.resolution.status,
            SlaStatus::Breached | SlaStatus::Transferred
        ) {
            self.resolve_breaches[index] += 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub evaluations: Vec<TicketEvaluation>,
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
    pub skipped: usize,
}
