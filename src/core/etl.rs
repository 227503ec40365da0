use crate::core::Pipeline;
use crate::utils::error::Result;

/// Runs a report pipeline end to end.
pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting SLA report");

        tracing::info!("Reading exports...");
        let data = self.pipeline.extract().await?;
        tracing::info!(
            "Read {} tickets, {} SLA records, {} overrides",
            data.tickets.len(),
            data.sla_records.len(),
            data.overrides.len()
        );

        tracing::info!("Evaluating SLAs...");
        let result = self.pipeline.transform(data).await?;
        tracing::info!("Reported {} tickets", result.rows.len());
        if result.skipped > 0 {
            tracing::warn!("Skipped {} tickets that could not be evaluated", result.skipped);
        }

        tracing::info!("Writing report...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Report saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExportSet, ReportSummary, TransformResult};
    use crate::utils::error::ReportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail_transform: bool,
    }

    #[async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<ExportSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ExportSet::default())
        }

        async fn transform(&self, _data: ExportSet) -> Result<TransformResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transform {
                return Err(ReportError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(TransformResult {
                evaluations: Vec::new(),
                rows: Vec::new(),
                summary: ReportSummary::default(),
                skipped: 0,
            })
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("out".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_calls_every_stage() {
        let engine = ReportEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: false,
        });
        assert_eq!(engine.run().await.unwrap(), "out");
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_error() {
        let engine = ReportEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: true,
        });
        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 2);
    }
}
