use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counters shared by every stage of one report run.
#[derive(Debug, Default)]
pub struct PipelineStats {
    labels_discovered: AtomicUsize,
    labels_skipped: AtomicUsize,
    devices_enriched: AtomicUsize,
    devices_classified: AtomicUsize,
    devices_degraded: AtomicUsize,
    devices_dropped: AtomicUsize,
    records_aggregated: AtomicUsize,
    workers_started: AtomicUsize,
    workers_active: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub labels_discovered: usize,
    pub labels_skipped: usize,
    pub devices_enriched: usize,
    pub devices_classified: usize,
    pub devices_degraded: usize,
    pub devices_dropped: usize,
    pub records_aggregated: usize,
    pub workers_started: usize,
    pub workers_active: usize,
}

impl PipelineStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            labels_discovered: self.labels_discovered.load(Ordering::SeqCst),
            labels_skipped: self.labels_skipped.load(Ordering::SeqCst),
            devices_enriched: self.devices_enriched.load(Ordering::SeqCst),
            devices_classified: self.devices_classified.load(Ordering::SeqCst),
            devices_degraded: self.devices_degraded.load(Ordering::SeqCst),
            devices_dropped: self.devices_dropped.load(Ordering::SeqCst),
            records_aggregated: self.records_aggregated.load(Ordering::SeqCst),
            workers_started: self.workers_started.load(Ordering::SeqCst),
            workers_active: self.workers_active.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn add_labels_discovered(&self, count: usize) {
        self.labels_discovered.fetch_add(count, Ordering::SeqCst);
    }

    pub(crate) fn label_skipped(&self) {
        self.labels_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn add_devices_enriched(&self, count: usize) {
        self.devices_enriched.fetch_add(count, Ordering::SeqCst);
    }

    pub(crate) fn device_classified(&self) {
        self.devices_classified.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn device_degraded(&self) {
        self.devices_degraded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn device_dropped(&self) {
        self.devices_dropped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_aggregated(&self) {
        self.records_aggregated.fetch_add(1, Ordering::SeqCst);
    }

    /// Counts a worker as live until the returned guard is dropped.
    pub(crate) fn worker_started(self: &Arc<Self>) -> ActiveWorker {
        self.workers_started.fetch_add(1, Ordering::SeqCst);
        self.workers_active.fetch_add(1, Ordering::SeqCst);
        ActiveWorker {
            stats: Arc::clone(self),
        }
    }
}

/// Dropped when a worker task ends, including by panic or runtime shutdown.
pub(crate) struct ActiveWorker {
    stats: Arc<PipelineStats>,
}

impl Drop for ActiveWorker {
    fn drop(&mut self) {
        self.stats.workers_active.fetch_sub(1, Ordering::SeqCst);
    }
}
