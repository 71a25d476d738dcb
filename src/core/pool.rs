//! Fixed-size worker pools sharing one input channel and one output channel.
//!
//! Each worker holds its own clone of the output sender. The pool keeps one more
//! and only drops it in [`WorkerPool::join_then_close`], after every worker task
//! has returned. The output channel therefore closes exactly once, and no send
//! can ever target a closed channel: a live sender means the channel is open.

use crate::core::stats::PipelineStats;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

pub struct WorkerPool<O> {
    name: &'static str,
    handles: Vec<JoinHandle<()>>,
    output: mpsc::Sender<O>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    pub workers: usize,
    pub panicked: usize,
}

impl<O: Send + 'static> WorkerPool<O> {
    /// Starts `size` workers. Each one pulls from `input` until it is closed and
    /// forwards whatever `handler` returns for the item.
    pub fn spawn<I, F, Fut>(
        name: &'static str,
        size: usize,
        input: mpsc::Receiver<I>,
        output: mpsc::Sender<O>,
        stats: Arc<PipelineStats>,
        handler: F,
    ) -> Self
    where
        I: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<O>> + Send + 'static,
    {
        let input = Arc::new(Mutex::new(input));
        let handler = Arc::new(handler);

        let handles = (0..size)
            .map(|worker_id| {
                let input = Arc::clone(&input);
                let handler = Arc::clone(&handler);
                let output = output.clone();
                let active = stats.worker_started();

                tokio::spawn(async move {
                    let _active = active;
                    loop {
                        let next = { input.lock().await.recv().await };
                        let Some(item) = next else {
                            break;
                        };

                        for produced in (*handler)(item).await {
                            if output.send(produced).await.is_err() {
                                tracing::warn!(
                                    "{} worker {}: downstream receiver is gone, stopping",
                                    name,
                                    worker_id
                                );
                                return;
                            }
                        }
                    }
                    tracing::debug!("{} worker {} drained its input", name, worker_id);
                })
            })
            .collect();

        tracing::debug!("{} pool started with {} workers", name, size);
        Self {
            name,
            handles,
            output,
        }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker, then releases the pool's sender, closing the output.
    pub async fn join_then_close(self) -> PoolReport {
        let WorkerPool {
            name,
            handles,
            output,
        } = self;

        let workers = handles.len();
        let mut panicked = 0;
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("{} worker terminated abnormally: {}", name, e);
                panicked += 1;
            }
        }

        drop(output);
        tracing::debug!("{} pool joined, output channel closed", name);
        PoolReport { workers, panicked }
    }
}
