use crate::adapters::exports;
use crate::core::report::{report_row, summary_rows, ReportDocument};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    ExportSet, ReportSummary, SlaOverride, SlaRecord, Ticket, TicketKind, TransformResult,
};
use crate::domain::ports::{ReportPeriod, TeamDirectory};
use crate::sla::SlaEvaluator;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const CSV_REPORT: &str = "sla_report.csv";
pub const CSV_SUMMARY: &str = "sla_summary.csv";
pub const JSON_REPORT: &str = "sla_report.json";
pub const BUNDLE: &str = "sla_report.zip";

const EXCLUDED_SERVICE: &str = "Other";
const CANCELLED_STATE: &str = "Cancelled";

pub struct SlaPipeline<S: Storage, C: ConfigProvider, T: TeamDirectory> {
    storage: S,
    config: C,
    evaluator: SlaEvaluator<T>,
    period: ReportPeriod,
}

impl<S: Storage, C: ConfigProvider, T: TeamDirectory> SlaPipeline<S, C, T> {
    pub fn new(storage: S, config: C, evaluator: SlaEvaluator<T>, period: ReportPeriod) -> Self {
        Self {
            storage,
            config,
            evaluator,
            period,
        }
    }

    fn input_path(&self, file: &str) -> String {
        Path::new(self.config.input_base_path())
            .join(file)
            .to_string_lossy()
            .into_owned()
    }

    fn output_file(&self, file: &str) -> String {
        Path::new(self.config.output_path())
            .join(file)
            .to_string_lossy()
            .into_owned()
    }

    async fn read_input(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.input_path(file);
        tracing::debug!("Reading {}", path);
        self.storage.read_file(&path).await
    }

    /// Whether a ticket belongs in this report at all.
    fn is_reportable(&self, ticket: &Ticket) -> bool {
        if ticket.service == EXCLUDED_SERVICE {
            return false;
        }
        if ticket.kind == TicketKind::Incident && ticket.state == CANCELLED_STATE {
            return false;
        }
        if ticket.updated.is_some_and(|updated| updated <= self.period.start) {
            return false;
        }
        !ticket.exclude || self.config.include_excluded()
    }

    fn to_csv<R: serde::Serialize>(rows: &[R]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| crate::utils::error::ReportError::IoError(e.into_error()))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, T: TeamDirectory> Pipeline for SlaPipeline<S, C, T> {
    async fn extract(&self) -> Result<ExportSet> {
        let mut data = ExportSet::default();

        if let Some(file) = self.config.incidents_file() {
            let incidents = exports::read_incidents(&self.read_input(file).await?)?;
            tracing::info!("Read {} incidents from {}", incidents.len(), file);
            data.tickets.extend(incidents);
        }
        if let Some(file) = self.config.incident_slas_file() {
            data.sla_records = exports::read_incident_slas(&self.read_input(file).await?)?;
            tracing::debug!("Read {} incident SLA records", data.sla_records.len());
        }
        if let Some(file) = self.config.requests_file() {
            let requests = exports::read_requests(&self.read_input(file).await?)?;
            tracing::info!("Read {} requests from {}", requests.len(), file);
            data.tickets.extend(requests);
        }
        if let Some(file) = self.config.overrides_file() {
            data.overrides = exports::read_overrides(&self.read_input(file).await?)?;
            tracing::debug!("Read {} SLA overrides", data.overrides.len());
        }

        Ok(data)
    }

    async fn transform(&self, data: ExportSet) -> Result<TransformResult> {
        let mut sla_records: HashMap<String, Vec<SlaRecord>> = HashMap::new();
        for record in data.sla_records {
            sla_records.entry(record.number.clone()).or_default().push(record);
        }
        let mut overrides: HashMap<String, Vec<SlaOverride>> = HashMap::new();
        for o in data.overrides {
            overrides.entry(o.number.clone()).or_default().push(o);
        }

        let total = data.tickets.len();
        let mut tickets: Vec<Ticket> = data
            .tickets
            .into_iter()
            .filter(|ticket| self.is_reportable(ticket))
            .collect();
        tickets.sort_by(|a, b| {
            (a.kind, a.priority_level(), &a.number).cmp(&(b.kind, b.priority_level(), &b.number))
        });
        tracing::debug!("{} of {} tickets are reportable", tickets.len(), total);

        let mut result = TransformResult {
            evaluations: Vec::new(),
            rows: Vec::new(),
            summary: ReportSummary::default(),
            skipped: 0,
        };

        for ticket in &tickets {
            let records = sla_records.get(&ticket.number).map(Vec::as_slice).unwrap_or(&[]);
            let ticket_overrides = overrides.get(&ticket.number).map(Vec::as_slice).unwrap_or(&[]);

            match self.evaluator.evaluate(ticket, records, ticket_overrides, &self.period) {
                Ok(Some(evaluation)) => {
                    result.summary.record(&evaluation);
                    result.rows.push(report_row(&evaluation));
                    result.evaluations.push(evaluation);
                }
                Ok(None) => tracing::debug!("{} is outside {}", ticket.number, self.period.label()),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", ticket.number, e);
                    result.skipped += 1;
                }
            }
        }

        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let mut files: Vec<(&str, Vec<u8>)> = Vec::new();

        for format in self.config.output_formats() {
            match format.as_str() {
                "csv" => {
                    files.push((CSV_REPORT, Self::to_csv(&result.rows)?));
                    files.push((CSV_SUMMARY, Self::to_csv(&summary_rows(&result.summary))?));
                }
                "json" => {
                    let document = ReportDocument {
                        period: self.period.label(),
                        skipped: result.skipped,
                        summary: summary_rows(&result.summary),
                        tickets: &result.rows,
                    };
                    files.push((JSON_REPORT, serde_json::to_vec_pretty(&document)?));
                }
                other => tracing::warn!("Ignoring unsupported output format '{}'", other),
            }
        }

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(&self.output_file(name), data).await?;
        }

        if !self.config.bundle_output() {
            return Ok(self.config.output_path().to_string());
        }

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &files {
                zip.start_file::<_, ()>(*name, FileOptions::default())?;
                zip.write_all(data)?;
            }
            zip.finish()?.into_inner()
        };

        let bundle_path = self.output_file(BUNDLE);
        tracing::debug!("Writing ZIP bundle ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&bundle_path, &zip_data).await?;
        Ok(bundle_path)
    }
}
