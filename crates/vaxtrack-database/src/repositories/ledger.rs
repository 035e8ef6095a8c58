//! Inventory ledger implementation.
//!
//! Every method runs one transaction in which the batch write and the
//! vaccine `total_stock` mirror write commit or roll back together.
//! Quantity guards are expressed in the UPDATE's WHERE clause so that
//! concurrent consumers serialize on the row instead of racing a
//! read-modify-write cycle.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use vaxtrack_core::error::{AppError, ErrorKind};
use vaxtrack_core::result::AppResult;
use vaxtrack_entity::batch::{BatchStatus, VaccineBatch};

use crate::store::InventoryLedger;

/// sqlx-backed inventory ledger.
#[derive(Debug, Clone)]
pub struct PgInventoryLedger {
    pool: PgPool,
}

impl PgInventoryLedger {
    /// Create a new ledger over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Conditionally remove `amount` units from a batch inside `conn`.
///
/// Returns the updated batch, or a typed error when the batch is
/// missing, not Available, or short of units. Shared between the
/// ledger and the dose unit of work so both paths apply the exact
/// same guard.
pub(crate) async fn decrement_batch(
    conn: &mut PgConnection,
    batch_id: Uuid,
    amount: i32,
) -> AppResult<VaccineBatch> {
    let updated = sqlx::query_as::<_, VaccineBatch>(
        "UPDATE vaccine_batches \
         SET current_quantity = current_quantity - $2, \
             status = CASE WHEN current_quantity - $2 = 0 \
                           THEN 'depleted'::batch_status ELSE status END, \
             updated_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL \
           AND status = 'available' AND current_quantity >= $2 \
         RETURNING *",
    )
    .bind(batch_id)
    .bind(amount)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to decrement batch", e))?;

    match updated {
        Some(batch) => Ok(batch),
        // The conditional update matched nothing; look at the row to
        // report the precise reason.
        None => {
            let existing = sqlx::query_as::<_, VaccineBatch>(
                "SELECT * FROM vaccine_batches WHERE id = $1 AND deleted_at IS NULL",
            )
            .bind(batch_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to inspect batch", e)
            })?;

            match existing {
                None => Err(AppError::batch_not_found(batch_id)),
                Some(b) if b.status != BatchStatus::Available => Err(
                    AppError::batch_not_available(format!("status is {}", b.status)),
                ),
                Some(_) => Err(AppError::insufficient_quantity(batch_id, amount)),
            }
        }
    }
}

/// Mirror a batch-level stock change onto the vaccine aggregate.
///
/// `delta` may be negative. Returns the new aggregate value.
pub(crate) async fn adjust_vaccine_stock(
    conn: &mut PgConnection,
    vaccine_id: Uuid,
    delta: i32,
) -> AppResult<i32> {
    sqlx::query_scalar::<_, i32>(
        "UPDATE vaccines SET total_stock = total_stock + $2, updated_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL \
         RETURNING total_stock",
    )
    .bind(vaccine_id)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to adjust vaccine stock", e))?
    .ok_or_else(|| AppError::vaccine_not_found(vaccine_id))
}

#[async_trait]
impl InventoryLedger for PgInventoryLedger {
    async fn register_batch(&self, batch: &VaccineBatch) -> AppResult<VaccineBatch> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let created = sqlx::query_as::<_, VaccineBatch>(
            "INSERT INTO vaccine_batches \
                 (id, vaccine_id, batch_number, initial_quantity, current_quantity, \
                  expiration_date, received_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(batch.id)
        .bind(batch.vaccine_id)
        .bind(&batch.batch_number)
        .bind(batch.initial_quantity)
        .bind(batch.current_quantity)
        .bind(batch.expiration_date)
        .bind(batch.received_date)
        .bind(batch.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("vaccine_batches_batch_number_key") =>
            {
                AppError::batch_number_exists(&batch.batch_number)
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create batch", e),
        })?;

        adjust_vaccine_stock(&mut tx, created.vaccine_id, created.current_quantity).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        info!(
            batch_id = %created.id,
            vaccine_id = %created.vaccine_id,
            quantity = created.initial_quantity,
            "Batch registered"
        );
        Ok(created)
    }

    async fn decrement_quantity(&self, batch_id: Uuid, amount: i32) -> AppResult<VaccineBatch> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let batch = decrement_batch(&mut tx, batch_id, amount).await?;
        adjust_vaccine_stock(&mut tx, batch.vaccine_id, -amount).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok(batch)
    }

    async fn increment_quantity(&self, batch_id: Uuid, amount: i32) -> AppResult<VaccineBatch> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let updated = sqlx::query_as::<_, VaccineBatch>(
            "UPDATE vaccine_batches \
             SET current_quantity = current_quantity + $2, \
                 status = CASE WHEN status = 'depleted' AND current_quantity + $2 > 0 \
                               THEN 'available'::batch_status ELSE status END, \
                 updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
               AND status IN ('available', 'depleted') \
               AND current_quantity + $2 <= initial_quantity \
             RETURNING *",
        )
        .bind(batch_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to increment batch", e))?
        .ok_or_else(|| {
            AppError::validation(format!(
                "Cannot add {amount} unit(s) to batch {batch_id}: batch missing, \
                 not restockable, or quantity would exceed the received amount"
            ))
        })?;

        adjust_vaccine_stock(&mut tx, updated.vaccine_id, amount).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok(updated)
    }

    async fn discard_batch(&self, batch_id: Uuid) -> AppResult<VaccineBatch> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let discarded = sqlx::query_as::<_, VaccineBatch>(
            "UPDATE vaccine_batches \
             SET status = 'discarded', updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND status = 'available' \
             RETURNING *",
        )
        .bind(batch_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to discard batch", e))?
        .ok_or_else(|| {
            AppError::batch_not_available("only an available batch can be discarded")
        })?;

        if discarded.current_quantity > 0 {
            adjust_vaccine_stock(&mut tx, discarded.vaccine_id, -discarded.current_quantity)
                .await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        info!(batch_id = %discarded.id, "Batch discarded");
        Ok(discarded)
    }

    async fn mark_expired_batches(&self, today: NaiveDate) -> AppResult<Vec<VaccineBatch>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let expired = sqlx::query_as::<_, VaccineBatch>(
            "UPDATE vaccine_batches \
             SET status = 'expired', updated_at = NOW() \
             WHERE status = 'available' AND deleted_at IS NULL AND expiration_date < $1 \
             RETURNING *",
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to expire batches", e)
        })?;

        for batch in &expired {
            if batch.current_quantity > 0 {
                adjust_vaccine_stock(&mut tx, batch.vaccine_id, -batch.current_quantity).await?;
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        if !expired.is_empty() {
            info!(count = expired.len(), "Expired batches transitioned");
        }
        Ok(expired)
    }

    async fn remove_batch(&self, batch_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let removed = sqlx::query_as::<_, VaccineBatch>(
            "UPDATE vaccine_batches \
             SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(batch_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove batch", e))?;

        let Some(batch) = removed else {
            return Ok(false);
        };

        if batch.status == BatchStatus::Available && batch.current_quantity > 0 {
            adjust_vaccine_stock(&mut tx, batch.vaccine_id, -batch.current_quantity).await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok(true)
    }
}
