//! Repository for the `inference_records` table.

use sqlx::types::Json;
use sqlx::PgPool;
use serveiq_core::detection::ProcessingResult;
use serveiq_core::types::RecordId;

use crate::models::record::{NewRecord, RecordListItem, RecordRow};

/// Column list shared across full-row queries.
const COLUMNS: &str = "id, location, image_data, upload_time, processed, \
     processed_image, detected_objects, summary, processed_timestamp";

/// Provides queries for inference records.
pub struct RecordRepo;

impl RecordRepo {
    /// Insert a new unprocessed record, returning the generated id.
    pub async fn create(pool: &PgPool, input: &NewRecord) -> Result<RecordId, sqlx::Error> {
        sqlx::query_scalar::<_, RecordId>(
            "INSERT INTO inference_records (location, image_data, upload_time, processed)
             VALUES ($1, $2, $3, false)
             RETURNING id",
        )
        .bind(&input.location)
        .bind(&input.image_data)
        .bind(input.upload_time)
        .fetch_one(pool)
        .await
    }

    /// Find a record by id.
    pub async fn find_by_id(pool: &PgPool, id: RecordId) -> Result<Option<RecordRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inference_records WHERE id = $1");
        sqlx::query_as::<_, RecordRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List records in creation order, skipping `offset` and returning at most `limit`.
    pub async fn list_page(
        pool: &PgPool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RecordListItem>, sqlx::Error> {
        sqlx::query_as::<_, RecordListItem>(
            "SELECT id, location, upload_time FROM inference_records
             ORDER BY upload_time ASC, seq ASC
             OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Most recently uploaded records first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<RecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inference_records
             ORDER BY upload_time DESC, seq DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, RecordRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Total number of records.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inference_records")
            .fetch_one(pool)
            .await
    }

    /// Write the detection result and flip `processed` in one statement.
    ///
    /// Only unprocessed rows are touched. Returns `true` if a row was updated.
    pub async fn mark_processed(
        pool: &PgPool,
        id: RecordId,
        result: &ProcessingResult,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE inference_records SET
                processed = true,
                processed_image = $2,
                detected_objects = $3,
                summary = $4,
                processed_timestamp = $5
             WHERE id = $1 AND processed = false",
        )
        .bind(id)
        .bind(&result.processed_image)
        .bind(Json(&result.detected_objects))
        .bind(Json(&result.summary))
        .bind(result.processed_timestamp)
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }
}
