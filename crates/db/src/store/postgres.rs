use async_trait::async_trait;
use serveiq_core::detection::ProcessingResult;
use serveiq_core::types::RecordId;

use super::{RecordStore, StoreError, UpdateOutcome};
use crate::models::record::{NewRecord, Record, RecordListItem};
use crate::repositories::RecordRepo;
use crate::DbPool;

/// [`RecordStore`] backed by the `inference_records` table.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, input: NewRecord) -> Result<RecordId, StoreError> {
        Ok(RecordRepo::create(&self.pool, &input).await?)
    }

    async fn find_one(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        let row = RecordRepo::find_by_id(&self.pool, id).await?;
        Ok(row.map(Record::from))
    }

    async fn find_many(&self, start: i64, limit: i64) -> Result<Vec<RecordListItem>, StoreError> {
        Ok(RecordRepo::list_page(&self.pool, start, limit).await?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(RecordRepo::count(&self.pool).await?)
    }

    async fn update_one(
        &self,
        id: RecordId,
        result: &ProcessingResult,
    ) -> Result<UpdateOutcome, StoreError> {
        let updated = RecordRepo::mark_processed(&self.pool, id, result).await?;
        Ok(if updated {
            UpdateOutcome::Applied
        } else {
            UpdateOutcome::Skipped
        })
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Record>, StoreError> {
        let rows = RecordRepo::list_recent(&self.pool, limit).await?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
