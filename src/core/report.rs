use crate::domain::model::{ReportRow, ReportSummary, SlaOutcome, TicketEvaluation, TimeSource, Transfer};
use chrono::NaiveDateTime;
use serde::Serialize;

const REPORT_TIME_FORMAT: &str = "%a %-d/%m %H:%M";

pub fn source_label(source: TimeSource) -> &'static str {
    match source {
        TimeSource::Open => "Open",
        TimeSource::Assigned => "Assigned",
        TimeSource::Touch => "Touch",
        TimeSource::Sla => "SLA",
        TimeSource::OriginalPriority => "Original Priority",
        TimeSource::ResolveStart => "Resolve Start",
        TimeSource::Resolved => "Resolved",
        TimeSource::Override => "Override",
    }
}

fn format_time(at: NaiveDateTime) -> String {
    at.format(REPORT_TIME_FORMAT).to_string()
}

/// `Mon 1/07 09:00 (Touch)`, or empty when there is no time.
fn format_sourced(at: Option<NaiveDateTime>, source: Option<TimeSource>) -> String {
    match (at, source) {
        (Some(at), Some(source)) => format!("{} ({})", format_time(at), source_label(source)),
        (Some(at), None) => format_time(at),
        (None, _) => String::new(),
    }
}

pub fn format_transfers(transfers: &[Transfer]) -> String {
    transfers
        .iter()
        .map(|t| format!("{} -> {}", format_time(t.from), format_time(t.to)))
        .collect::<Vec<_>>()
        .join("; ")
}

fn status_text(outcome: &SlaOutcome) -> String {
    outcome.status.to_string()
}

pub fn report_row(evaluation: &TicketEvaluation) -> ReportRow {
    let response = &evaluation.response;
    let resolution = &evaluation.resolution;

    ReportRow {
        kind: evaluation.kind,
        number: evaluation.number.clone(),
        priority: evaluation.priority,
        service: evaluation.service.clone(),
        description: evaluation.short_description.clone(),
        opened: format_time(evaluation.opened),
        received: format_sourced(response.start, response.start_source),
        response_target: response.target.to_string(),
        responded: format_sourced(response.stop, response.stop_source),
        response_duration: response.duration_text(),
        response_status: status_text(response),
        resolve_target: resolution.target.to_string(),
        resolved: format_sourced(resolution.stop, resolution.stop_source),
        resolve_duration: resolution.duration_text(),
        resolve_status: status_text(resolution),
        team_duration: evaluation
            .team_duration
            .map(|d| d.to_string())
            .unwrap_or_default(),
        transfers: format_transfers(&evaluation.transfers),
        notes: evaluation.notes.clone(),
    }
}

/// One line of the per-priority summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub priority: String,
    pub responded: u32,
    pub response_breaches: u32,
    pub resolved: u32,
    pub resolve_breaches: u32,
}

pub fn summary_rows(summary: &ReportSummary) -> Vec<SummaryRow> {
    (0..5)
        .map(|i| SummaryRow {
            priority: format!("P{}", i + 1),
            responded: summary.responded[i],
            response_breaches: summary.response_breaches[i],
            resolved: summary.resolved[i],
            resolve_breaches: summary.resolve_breaches[i],
        })
        .collect()
}

/// Layout of `sla_report.json`.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub period: String,
    pub skipped: usize,
    pub summary: Vec<SummaryRow>,
    pub tickets: &'a [ReportRow],
}
