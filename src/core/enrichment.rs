use crate::core::pool::WorkerPool;
use crate::core::stats::PipelineStats;
use crate::domain::model::{DeviceWorkItem, Label};
use crate::domain::ports::InventoryClient;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const POOL_NAME: &str = "enrichment";

/// Starts the pool that turns each label into its devices' work items.
pub fn spawn_pool(
    client: Arc<dyn InventoryClient>,
    size: usize,
    labels: mpsc::Receiver<Label>,
    items: mpsc::Sender<DeviceWorkItem>,
    stats: Arc<PipelineStats>,
) -> WorkerPool<DeviceWorkItem> {
    let handler_stats = Arc::clone(&stats);
    WorkerPool::spawn(POOL_NAME, size, labels, items, stats, move |label| {
        let client = Arc::clone(&client);
        let stats = Arc::clone(&handler_stats);
        async move { enrich_label(client.as_ref(), label, &stats).await }
    })
}

/// Fetches a label's devices. A failed call skips the label.
pub async fn enrich_label(
    client: &dyn InventoryClient,
    label: Label,
    stats: &PipelineStats,
) -> Vec<DeviceWorkItem> {
    tracing::debug!("Fetching devices for label {} ({})", label.id, label.name);

    match client.devices_by_label(label.id).await {
        Ok(devices) => {
            stats.add_devices_enriched(devices.len());
            devices
                .into_iter()
                .map(|device| DeviceWorkItem::from_record(&label.name, device))
                .collect()
        }
        Err(e) => {
            tracing::warn!(
                "Skipping label {} ({}): {} [{:?}]",
                label.id,
                label.name,
                e,
                e.category()
            );
            stats.label_skipped();
            Vec::new()
        }
    }
}
