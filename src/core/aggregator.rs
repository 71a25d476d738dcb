use crate::core::stats::PipelineStats;
use crate::domain::model::{ClassifiedRecord, Report};
use crate::utils::error::{CdsError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// The single task that owns the report while it is being built.
pub struct AggregatorHandle {
    done: oneshot::Receiver<Report>,
    task: JoinHandle<()>,
}

pub fn spawn(records: mpsc::Receiver<ClassifiedRecord>, stats: Arc<PipelineStats>) -> AggregatorHandle {
    let (done_tx, done_rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        let report = aggregate(records, &stats).await;
        if done_tx.send(report).is_err() {
            tracing::warn!("Report finished but nobody is waiting for it");
        }
    });

    AggregatorHandle {
        done: done_rx,
        task,
    }
}

/// Drains `records` until closed, then sorts every domain by serial number.
pub async fn aggregate(
    mut records: mpsc::Receiver<ClassifiedRecord>,
    stats: &PipelineStats,
) -> Report {
    let mut domains: HashMap<String, Vec<ClassifiedRecord>> = HashMap::new();

    while let Some(record) = records.recv().await {
        stats.record_aggregated();
        domains.entry(record.domain.clone()).or_default().push(record);
    }

    for records in domains.values_mut() {
        records.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
    }

    tracing::debug!("Aggregated {} domains", domains.len());
    Report::from_domains(domains)
}

impl AggregatorHandle {
    /// Resolves once the aggregator has seen its input close and finalized the report.
    pub async fn wait(self) -> Result<Report> {
        match self.done.await {
            Ok(report) => {
                if let Err(e) = self.task.await {
                    tracing::warn!("Aggregator task ended abnormally after completion: {}", e);
                }
                Ok(report)
            }
            Err(_) => {
                let reason = match self.task.await {
                    Err(e) => e.to_string(),
                    Ok(()) => "completion signal dropped".to_string(),
                };
                Err(CdsError::ProcessingError {
                    message: format!("aggregator stopped before finishing the report: {}", reason),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(domain: &str, sn: &str) -> ClassifiedRecord {
        ClassifiedRecord {
            domain: domain.to_string(),
            serial_number: sn.to_string(),
            company: "Acme".to_string(),
            status: "up".to_string(),
            online_users_max: 1,
            service_kbps_max: 1024,
            tier: 500,
            formatted_usage: "1/1.0Mbps".to_string(),
        }
    }

    #[tokio::test]
    async fn test_groups_by_domain_and_sorts_by_serial() {
        let stats = PipelineStats::new();
        let (tx, rx) = mpsc::channel(10);
        let handle = spawn(rx, Arc::clone(&stats));

        for (domain, sn) in [("A", "S3"), ("B", "S9"), ("A", "S1"), ("A", "S2")] {
            tx.send(record(domain, sn)).await.unwrap();
        }
        drop(tx);

        let report = handle.wait().await.unwrap();
        let serials: Vec<&str> = report
            .get("A")
            .unwrap()
            .iter()
            .map(|r| r.serial_number.as_str())
            .collect();

        assert_eq!(serials, vec!["S1", "S2", "S3"]);
        assert_eq!(report.get("B").unwrap().len(), 1);
        assert_eq!(report.domains(), vec!["A", "B"]);
        assert_eq!(stats.snapshot().records_aggregated, 4);
    }

    #[tokio::test]
    async fn test_completion_waits_for_input_to_close() {
        let (tx, rx) = mpsc::channel(1);
        let mut handle = spawn(rx, PipelineStats::new());

        tx.send(record("A", "S1")).await.unwrap();
        tokio::task::yield_now().await;
        assert!(handle.done.try_recv().is_err());

        drop(tx);
        let report = handle.wait().await.unwrap();
        assert_eq!(report.device_count(), 1);
    }

    #[tokio::test]
    async fn test_no_records_yields_empty_report() {
        let (tx, rx) = mpsc::channel::<ClassifiedRecord>(1);
        drop(tx);

        let report = spawn(rx, PipelineStats::new()).wait().await.unwrap();
        assert!(report.is_empty());
    }
}
