//! The record store interface.
//!
//! Ingest, query and processing code depend on [`RecordStore`] rather than
//! a concrete database so each component can be handed its store at
//! construction and exercised against [`MemoryRecordStore`] in tests.

use async_trait::async_trait;
use serveiq_core::detection::ProcessingResult;
use serveiq_core::types::RecordId;

use crate::models::record::{NewRecord, Record, RecordListItem};

mod memory;
mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Errors surfaced by a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database rejected or failed the operation.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store cannot be reached or refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result of writing a detection result onto a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record was unprocessed and now carries the result.
    Applied,
    /// No unprocessed record with that id exists; nothing was written.
    Skipped,
}

/// Persistence capability for inference records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new unprocessed record and return its store-assigned id.
    async fn insert(&self, input: NewRecord) -> Result<RecordId, StoreError>;

    /// Fetch a full record by id.
    async fn find_one(&self, id: RecordId) -> Result<Option<Record>, StoreError>;

    /// List records in creation order with skip/limit pagination.
    async fn find_many(&self, start: i64, limit: i64) -> Result<Vec<RecordListItem>, StoreError>;

    /// Count all records.
    async fn count(&self) -> Result<i64, StoreError>;

    /// Write `processed = true` and the whole result group in a single update.
    ///
    /// Records that are already processed are left untouched.
    async fn update_one(
        &self,
        id: RecordId,
        result: &ProcessingResult,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Most recently uploaded records first.
    async fn recent(&self, limit: i64) -> Result<Vec<Record>, StoreError>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Store name for logging.
    fn name(&self) -> &'static str;
}
