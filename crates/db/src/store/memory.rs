use async_trait::async_trait;
use serveiq_core::detection::ProcessingResult;
use serveiq_core::types::RecordId;
use tokio::sync::RwLock;

use super::{RecordStore, StoreError, UpdateOutcome};
use crate::models::record::{NewRecord, Record, RecordListItem};

/// In-process [`RecordStore`] keeping records in insertion order.
///
/// Every operation holds the lock for its whole duration, so an update is
/// never visible half-applied.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, input: NewRecord) -> Result<RecordId, StoreError> {
        let id = uuid::Uuid::now_v7();
        self.records
            .write()
            .await
            .push(Record::unprocessed(id, input));
        Ok(id)
    }

    async fn find_one(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_many(&self, start: i64, limit: i64) -> Result<Vec<RecordListItem>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .skip(start.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(RecordListItem::from)
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.records.read().await.len() as i64)
    }

    async fn update_one(
        &self,
        id: RecordId,
        result: &ProcessingResult,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id && !r.processed) {
            Some(record) => {
                record.processed = true;
                record.result = Some(result.clone());
                Ok(UpdateOutcome::Applied)
            }
            None => Ok(UpdateOutcome::Skipped),
        }
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Record>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
