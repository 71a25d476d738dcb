use crate::core::stats::PipelineStats;
use crate::domain::model::Label;
use crate::domain::ports::InventoryClient;
use crate::utils::error::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Labels discovered by the single up-front call. A failure here is fatal to the run.
#[derive(Debug)]
pub struct LabelSource {
    labels: Vec<Label>,
}

impl LabelSource {
    pub async fn discover(client: &dyn InventoryClient, stats: &PipelineStats) -> Result<Self> {
        let labels = client.fetch_labels().await.map_err(|e| {
            tracing::error!("❌ Label discovery failed: {}", e);
            e
        })?;

        if labels.is_empty() {
            tracing::info!("No labels returned, report will be empty");
        } else {
            tracing::info!("Discovered {} labels", labels.len());
        }
        stats.add_labels_discovered(labels.len());
        Ok(Self { labels })
    }

    pub fn from_labels(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Pushes every label into `sender` and drops it, closing the label channel.
    /// Resolves to the number of labels delivered.
    pub fn spawn_emitter(self, sender: mpsc::Sender<Label>) -> JoinHandle<usize> {
        tokio::spawn(async move {
            let mut delivered = 0;
            for label in self.labels {
                if sender.send(label).await.is_err() {
                    tracing::warn!("Label channel closed early after {} labels", delivered);
                    break;
                }
                delivered += 1;
            }
            tracing::debug!("Label emitter finished, closing label channel");
            delivered
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(id: i64) -> Label {
        Label {
            id,
            name: format!("L{}", id),
            device_count: 0,
        }
    }

    #[tokio::test]
    async fn test_emitter_delivers_then_closes() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = LabelSource::from_labels(vec![label(1), label(2), label(3)]).spawn_emitter(tx);

        let mut ids = Vec::new();
        while let Some(label) = rx.recv().await {
            ids.push(label.id);
        }

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_source_closes_immediately() {
        let (tx, mut rx) = mpsc::channel(1);
        let source = LabelSource::from_labels(Vec::new());
        assert!(source.is_empty());

        let handle = source.spawn_emitter(tx);
        assert_eq!(rx.recv().await, None);
        assert_eq!(handle.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_emitter_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let delivered = LabelSource::from_labels(vec![label(1), label(2)])
            .spawn_emitter(tx)
            .await
            .unwrap();
        assert_eq!(delivered, 0);
    }
}
