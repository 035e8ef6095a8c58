//! Vaccine repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use vaxtrack_core::error::{AppError, ErrorKind};
use vaxtrack_core::result::AppResult;
use vaxtrack_core::traits::Repository;
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_entity::vaccine::Vaccine;

use crate::store::VaccineStore;

/// Repository for vaccine catalog CRUD and query operations.
///
/// `total_stock` is deliberately absent from the `update` column list;
/// only the inventory ledger writes it.
#[derive(Debug, Clone)]
pub struct VaccineRepository {
    pool: PgPool,
}

impl VaccineRepository {
    /// Create a new vaccine repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Vaccine, Uuid> for VaccineRepository {
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<Vaccine>> {
        sqlx::query_as::<_, Vaccine>("SELECT * FROM vaccines WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find vaccine by id", e)
            })
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Vaccine>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vaccines WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count vaccines", e)
                })?;

        let vaccines = sqlx::query_as::<_, Vaccine>(
            "SELECT * FROM vaccines WHERE deleted_at IS NULL ORDER BY name ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list vaccines", e))?;

        Ok(PageResponse::new(
            vaccines,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn create(&self, vaccine: &Vaccine) -> AppResult<Vaccine> {
        sqlx::query_as::<_, Vaccine>(
            "INSERT INTO vaccines (id, name, manufacturer, doses_required, interval_days, \
                                   is_obligatory, min_stock_level, total_stock) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(vaccine.id)
        .bind(&vaccine.name)
        .bind(&vaccine.manufacturer)
        .bind(vaccine.doses_required)
        .bind(vaccine.interval_days)
        .bind(vaccine.is_obligatory)
        .bind(vaccine.min_stock_level)
        .bind(vaccine.total_stock)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create vaccine", e))
    }

    async fn update(&self, vaccine: &Vaccine) -> AppResult<Vaccine> {
        sqlx::query_as::<_, Vaccine>(
            "UPDATE vaccines SET doses_required = $2, \
                                 interval_days = $3, \
                                 is_obligatory = $4, \
                                 min_stock_level = $5, \
                                 updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(vaccine.id)
        .bind(vaccine.doses_required)
        .bind(vaccine.interval_days)
        .bind(vaccine.is_obligatory)
        .bind(vaccine.min_stock_level)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update vaccine", e))?
        .ok_or_else(|| AppError::vaccine_not_found(vaccine.id))
    }

    async fn delete(&self, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE vaccines SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete vaccine", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl VaccineStore for VaccineRepository {
    async fn find_below_min_stock(&self) -> AppResult<Vec<Vaccine>> {
        sqlx::query_as::<_, Vaccine>(
            "SELECT * FROM vaccines \
             WHERE deleted_at IS NULL AND total_stock < min_stock_level \
             ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list low-stock vaccines", e)
        })
    }
}
