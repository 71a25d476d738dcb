use crate::core::label_source::LabelSource;
use crate::core::settings::PipelineConfig;
use crate::core::stats::PipelineStats;
use crate::core::{aggregator, classification, enrichment};
use crate::domain::model::Report;
use crate::domain::ports::InventoryClient;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Wires label discovery, the two pools, and the aggregator into one report run.
pub struct ReportBuilder {
    client: Arc<dyn InventoryClient>,
    config: PipelineConfig,
    stats: Arc<PipelineStats>,
}

impl ReportBuilder {
    pub fn new(client: Arc<dyn InventoryClient>, config: PipelineConfig) -> Self {
        Self {
            client,
            config,
            stats: PipelineStats::new(),
        }
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Runs the pipeline to completion.
    ///
    /// Label discovery happens before any channel or worker exists, so a failure
    /// there returns immediately with nothing left running. Later per-item
    /// failures are absorbed by the pools and never surface here.
    pub async fn build(&self) -> Result<Report> {
        self.config.validate()?;
        let started = Instant::now();
        let stats = Arc::clone(&self.stats);

        let source = LabelSource::discover(self.client.as_ref(), &stats).await?;

        let (label_tx, label_rx) = mpsc::channel(self.config.label_buffer);
        let (item_tx, item_rx) = mpsc::channel(self.config.device_buffer);
        let (record_tx, record_rx) = mpsc::channel(self.config.classified_buffer);

        let emitter = source.spawn_emitter(label_tx);
        let enrichment = enrichment::spawn_pool(
            Arc::clone(&self.client),
            self.config.enrichment_workers,
            label_rx,
            item_tx,
            Arc::clone(&stats),
        );
        let classification = classification::spawn_pool(
            Arc::clone(&self.client),
            self.config.classification_workers,
            self.config.on_classification_failure,
            item_rx,
            record_tx,
            Arc::clone(&stats),
        );
        let aggregator = aggregator::spawn(record_rx, Arc::clone(&stats));

        // Close order follows the data: labels, work items, classified records.
        match emitter.await {
            Ok(delivered) => tracing::debug!("{} labels handed to enrichment", delivered),
            Err(e) => tracing::error!("Label emitter terminated abnormally: {}", e),
        }
        let enriched = enrichment.join_then_close().await;
        let classified = classification.join_then_close().await;
        if enriched.panicked + classified.panicked > 0 {
            tracing::warn!(
                "{} enrichment and {} classification workers panicked",
                enriched.panicked,
                classified.panicked
            );
        }

        let report = aggregator.wait().await?;

        let snapshot = stats.snapshot();
        tracing::info!(
            "✅ Report built in {:?}: {} domains, {} devices ({} degraded, {} dropped), {} labels skipped",
            started.elapsed(),
            report.len(),
            report.device_count(),
            snapshot.devices_degraded,
            snapshot.devices_dropped,
            snapshot.labels_skipped
        );
        Ok(report)
    }
}

/// Builds a report with the default pool sizes and buffers.
pub async fn build_report(client: Arc<dyn InventoryClient>) -> Result<Report> {
    ReportBuilder::new(client, PipelineConfig::default())
        .build()
        .await
}
