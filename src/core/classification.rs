use crate::core::pool::WorkerPool;
use crate::core::settings::ClassificationFailurePolicy;
use crate::core::stats::PipelineStats;
use crate::domain::capacity::{classify, format_usage};
use crate::domain::model::{ClassifiedRecord, DeviceWorkItem};
use crate::domain::ports::InventoryClient;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const POOL_NAME: &str = "classification";

pub fn spawn_pool(
    client: Arc<dyn InventoryClient>,
    size: usize,
    policy: ClassificationFailurePolicy,
    items: mpsc::Receiver<DeviceWorkItem>,
    records: mpsc::Sender<ClassifiedRecord>,
    stats: Arc<PipelineStats>,
) -> WorkerPool<ClassifiedRecord> {
    let handler_stats = Arc::clone(&stats);
    WorkerPool::spawn(POOL_NAME, size, items, records, stats, move |item| {
        let client = Arc::clone(&client);
        let stats = Arc::clone(&handler_stats);
        async move {
            classify_item(client.as_ref(), item, policy, &stats)
                .await
                .into_iter()
                .collect()
        }
    })
}

/// Looks up the device's disks and derives its tier. On failure the policy decides.
pub async fn classify_item(
    client: &dyn InventoryClient,
    item: DeviceWorkItem,
    policy: ClassificationFailurePolicy,
    stats: &PipelineStats,
) -> Option<ClassifiedRecord> {
    match client.disk_count(&item.serial_number).await {
        Ok(count) => {
            let tier = classify(count);
            let usage = format_usage(item.online_users_max, item.service_kbps_max);
            stats.device_classified();
            Some(ClassifiedRecord::new(item, tier, usage))
        }
        Err(e) => {
            tracing::warn!(
                "Disk inventory for {} unavailable: {} [{:?}]",
                item.serial_number,
                e,
                e.category()
            );
            let recovered = policy.recover(item);
            if recovered.is_some() {
                stats.device_degraded();
            } else {
                stats.device_dropped();
            }
            recovered
        }
    }
}
