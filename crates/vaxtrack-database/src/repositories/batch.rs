//! Batch repository implementation (read-side queries).

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use vaxtrack_core::error::{AppError, ErrorKind};
use vaxtrack_core::result::AppResult;
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_entity::batch::VaccineBatch;

use crate::store::BatchStore;

/// Repository for batch lookups and selection-policy queries.
///
/// Mutations live on the ledger; this type only reads.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: PgPool,
}

impl BatchRepository {
    /// Create a new batch repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BatchStore for BatchRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VaccineBatch>> {
        sqlx::query_as::<_, VaccineBatch>(
            "SELECT * FROM vaccine_batches WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find batch by id", e))
    }

    async fn find_by_batch_number(&self, batch_number: &str) -> AppResult<Option<VaccineBatch>> {
        sqlx::query_as::<_, VaccineBatch>(
            "SELECT * FROM vaccine_batches WHERE batch_number = $1 AND deleted_at IS NULL",
        )
        .bind(batch_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find batch by number", e)
        })
    }

    async fn find_by_vaccine(
        &self,
        vaccine_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineBatch>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vaccine_batches WHERE vaccine_id = $1 AND deleted_at IS NULL",
        )
        .bind(vaccine_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count batches", e))?;

        let batches = sqlx::query_as::<_, VaccineBatch>(
            "SELECT * FROM vaccine_batches \
             WHERE vaccine_id = $1 AND deleted_at IS NULL \
             ORDER BY received_date ASC LIMIT $2 OFFSET $3",
        )
        .bind(vaccine_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list batches", e))?;

        Ok(PageResponse::new(
            batches,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn find_oldest_available(&self, vaccine_id: Uuid) -> AppResult<Option<VaccineBatch>> {
        sqlx::query_as::<_, VaccineBatch>(
            "SELECT * FROM vaccine_batches \
             WHERE vaccine_id = $1 AND status = 'available' \
               AND current_quantity > 0 AND deleted_at IS NULL \
             ORDER BY received_date ASC, created_at ASC LIMIT 1",
        )
        .bind(vaccine_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to run FIFO lookup", e))
    }

    async fn find_soonest_expiring(
        &self,
        vaccine_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<Option<VaccineBatch>> {
        sqlx::query_as::<_, VaccineBatch>(
            "SELECT * FROM vaccine_batches \
             WHERE vaccine_id = $1 AND status = 'available' \
               AND current_quantity > 0 AND expiration_date >= $2 AND deleted_at IS NULL \
             ORDER BY expiration_date ASC, created_at ASC LIMIT 1",
        )
        .bind(vaccine_id)
        .bind(today)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to run FEFO lookup", e))
    }
}
