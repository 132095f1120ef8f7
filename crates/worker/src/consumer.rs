//! Single-flight consume loop.

use serveiq_detect::Detector;
use serveiq_events::NewFileEvent;
use tokio::sync::mpsc;

use crate::processor::{ProcessError, Processor};

/// Counters for one consumer run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Pulls events one at a time and processes each to completion before
/// taking the next.
pub struct Consumer<D> {
    processor: Processor<D>,
    stats: ConsumerStats,
}

impl<D: Detector> Consumer<D> {
    pub fn new(processor: Processor<D>) -> Self {
        Self {
            processor,
            stats: ConsumerStats::default(),
        }
    }

    /// Consume until the sending side is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<NewFileEvent>) -> ConsumerStats {
        while let Some(event) = events.recv().await {
            self.handle(&event).await;
        }
        tracing::info!(
            processed = self.stats.processed,
            skipped = self.stats.skipped,
            failed = self.stats.failed,
            "Event queue closed, consumer stopping"
        );
        self.stats
    }

    /// Process one event. Failures are logged and dropped; nothing is retried.
    pub async fn handle(&mut self, event: &NewFileEvent) {
        tracing::info!(
            document_id = %event.document_id,
            location = %event.location,
            "New file notification received"
        );

        match self.processor.process(event).await {
            Ok(result) => {
                self.stats.processed += 1;
                tracing::info!(
                    document_id = %event.document_id,
                    summary = ?result.summary,
                    "Record processed"
                );
            }
            Err(e @ ProcessError::AlreadyProcessed(_)) => {
                self.stats.skipped += 1;
                tracing::warn!(document_id = %event.document_id, error = %e, "Skipping record");
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::error!(
                    document_id = %event.document_id,
                    stage = e.stage(),
                    error = %e,
                    "Abandoning record, it stays unprocessed"
                );
            }
        }
    }
}
