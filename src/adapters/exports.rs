//! Readers for the ticketing system's CSV exports.
//!
//! Export headers are translated to model field names; timestamp cells are
//! normalized with [`convert_field`] before parsing.

use crate::calendar::{parse_optional_timestamp, parse_timestamp};
use crate::domain::model::{SlaKind, SlaOverride, SlaRecord, Ticket, TicketKind};
use crate::utils::error::{ReportError, Result};
use crate::utils::fields::{convert_field, parse_flag};
use csv::ReaderBuilder;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTable {
    Incident,
    IncidentSla,
    Request,
    SlaOverride,
}

impl ExportTable {
    /// Export column name (dots replaced by underscores) to model field.
    fn translations(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ExportTable::Incident => &[
                ("number", "number"),
                ("opened_at", "opened"),
                ("short_description", "short_description"),
                ("caller_id", "caller"),
                ("priority", "priority"),
                ("state", "state"),
                ("assigned_to", "assigned_to"),
                ("comments_and_work_notes", "comments_and_work_notes"),
                ("sys_updated_on", "updated"),
                ("resolved_at", "resolved"),
                ("business_service", "service"),
                ("report_priority", "report_priority"),
                ("reporting_service", "reporting_service"),
                ("notes", "notes"),
                ("exclude", "exclude"),
            ],
            ExportTable::IncidentSla => &[
                ("inc_number", "number"),
                ("taskslatable_sla", "definition"),
                ("taskslatable_stage", "stage"),
                ("taskslatable_start_time", "start_time"),
                ("taskslatable_end_time", "stop_time"),
                ("taskslatable_planned_end_time", "breach_time"),
                ("inc_made_sla", "made_sla"),
            ],
            ExportTable::Request => &[
                ("number", "number"),
                ("request_item", "request_item"),
                ("request_item_request_u_requested_by", "caller"),
                ("state", "state"),
                ("priority", "priority"),
                ("short_description", "short_description"),
                ("assigned_to", "assigned_to"),
                ("comments_and_work_notes", "comments_and_work_notes"),
                ("opened_at", "opened"),
                ("closed_at", "resolved"),
                ("sys_updated_on", "updated"),
                ("service", "service"),
                ("report_priority", "report_priority"),
                ("notes", "notes"),
                ("exclude", "exclude"),
            ],
            ExportTable::SlaOverride => &[
                ("number", "number"),
                ("sla", "sla"),
                ("start_time", "start_time"),
                ("end_time", "end_time"),
            ],
        }
    }

    fn required(&self) -> &'static [&'static str] {
        match self {
            ExportTable::Incident | ExportTable::Request => &["number", "priority", "opened"],
            ExportTable::IncidentSla => &["number", "definition"],
            ExportTable::SlaOverride => &["number", "sla"],
        }
    }
}

/// Exports are written in ISO-8859-1; UTF-8 input is passed through.
pub fn decode_export(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

struct ExportRow<'a> {
    values: Vec<String>,
    columns: &'a HashMap<&'static str, usize>,
    line: usize,
}

impl ExportRow<'_> {
    fn get(&self, field: &str) -> &str {
        self.columns
            .get(field)
            .and_then(|&i| self.values.get(i))
            .map(|v| v.as_str())
            .unwrap_or("")
    }

    fn required(&self, field: &str) -> Result<&str> {
        let value = self.get(field);
        if value.trim().is_empty() {
            return Err(ReportError::ValidationError {
                message: format!("line {}: '{}' is empty", self.line, field),
            });
        }
        Ok(value)
    }
}

fn read_table<T, F>(data: &[u8], table: ExportTable, mut build: F) -> Result<Vec<T>>
where
    F: FnMut(&ExportRow<'_>) -> Result<T>,
{
    let text = decode_export(data);
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());

    let translations: HashMap<&str, &'static str> = table.translations().iter().copied().collect();
    let mut columns: HashMap<&'static str, usize> = HashMap::new();
    for (i, header) in reader.headers()?.iter().enumerate() {
        let key = header.trim().replace('.', "_");
        match translations.get(key.as_str()) {
            Some(&field) => {
                columns.entry(field).or_insert(i);
            }
            None => tracing::debug!("{:?} export: ignoring column '{}'", table, header),
        }
    }

    for field in table.required() {
        if !columns.contains_key(field) {
            return Err(ReportError::ValidationError {
                message: format!("{:?} export is missing the '{}' column", table, field),
            });
        }
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = ExportRow {
            values: record.iter().map(convert_field).collect(),
            columns: &columns,
            line: i + 2,
        };
        rows.push(build(&row)?);
    }

    tracing::debug!("Read {} rows from {:?} export", rows.len(), table);
    Ok(rows)
}

fn read_tickets(data: &[u8], table: ExportTable, kind: TicketKind) -> Result<Vec<Ticket>> {
    read_table(data, table, |row| {
        let priority = row.required("priority")?.to_string();
        let report_priority = match row.get("report_priority") {
            "" => priority.clone(),
            value => value.to_string(),
        };
        let service = match row.get("reporting_service") {
            "" => row.get("service").to_string(),
            value => value.to_string(),
        };

        Ok(Ticket {
            kind,
            number: row.required("number")?.to_string(),
            service,
            state: row.get("state").to_string(),
            priority,
            report_priority,
            caller: row.get("caller").to_string(),
            assigned_to: row.get("assigned_to").to_string(),
            short_description: row.get("short_description").to_string(),
            opened: parse_timestamp(row.required("opened")?)?,
            resolved: parse_optional_timestamp(row.get("resolved"))?,
            updated: parse_optional_timestamp(row.get("updated"))?,
            comments_and_work_notes: row.get("comments_and_work_notes").to_string(),
            notes: row.get("notes").to_string(),
            exclude: parse_flag(row.get("exclude")).unwrap_or(false),
        })
    })
}

pub fn read_incidents(data: &[u8]) -> Result<Vec<Ticket>> {
    read_tickets(data, ExportTable::Incident, TicketKind::Incident)
}

pub fn read_requests(data: &[u8]) -> Result<Vec<Ticket>> {
    read_tickets(data, ExportTable::Request, TicketKind::Request)
}

pub fn read_incident_slas(data: &[u8]) -> Result<Vec<SlaRecord>> {
    read_table(data, ExportTable::IncidentSla, |row| {
        Ok(SlaRecord {
            number: row.required("number")?.to_string(),
            definition: row.required("definition")?.trim().to_string(),
            stage: row.get("stage").to_string(),
            start_time: parse_optional_timestamp(row.get("start_time"))?,
            stop_time: parse_optional_timestamp(row.get("stop_time"))?,
            breach_time: parse_optional_timestamp(row.get("breach_time"))?,
            made_sla: parse_flag(row.get("made_sla")),
        })
    })
}

pub fn read_overrides(data: &[u8]) -> Result<Vec<SlaOverride>> {
    read_table(data, ExportTable::SlaOverride, |row| {
        let sla = row
            .required("sla")?
            .parse::<SlaKind>()
            .map_err(|message| ReportError::ValidationError {
                message: format!("line {}: {}", row.line, message),
            })?;

        Ok(SlaOverride {
            number: row.required("number")?.to_string(),
            sla,
            start_time: parse_optional_timestamp(row.get("start_time"))?,
            end_time: parse_optional_timestamp(row.get("end_time"))?,
        })
    })
}
