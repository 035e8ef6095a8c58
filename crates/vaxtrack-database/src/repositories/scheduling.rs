//! Scheduling repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vaxtrack_core::error::{AppError, ErrorKind};
use vaxtrack_core::result::AppResult;
use vaxtrack_core::traits::Repository;
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_entity::scheduling::VaccineScheduling;

use crate::store::SchedulingStore;

/// Repository for scheduling CRUD and slot queries.
#[derive(Debug, Clone)]
pub struct SchedulingRepository {
    pool: PgPool,
}

impl SchedulingRepository {
    /// Create a new scheduling repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<VaccineScheduling, Uuid> for SchedulingRepository {
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<VaccineScheduling>> {
        // Cancelled rows stay addressable so callers can report the
        // cancellation instead of a generic not-found. List queries
        // still exclude them.
        sqlx::query_as::<_, VaccineScheduling>(
            "SELECT * FROM vaccine_schedulings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find scheduling by id", e)
        })
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<VaccineScheduling>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vaccine_schedulings WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count schedulings", e)
                })?;

        let schedulings = sqlx::query_as::<_, VaccineScheduling>(
            "SELECT * FROM vaccine_schedulings WHERE deleted_at IS NULL \
             ORDER BY scheduled_date DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list schedulings", e))?;

        Ok(PageResponse::new(
            schedulings,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn create(&self, scheduling: &VaccineScheduling) -> AppResult<VaccineScheduling> {
        sqlx::query_as::<_, VaccineScheduling>(
            "INSERT INTO vaccine_schedulings \
                 (id, user_id, vaccine_id, dose_number, scheduled_date, status, \
                  assigned_nurse_id, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(scheduling.id)
        .bind(scheduling.user_id)
        .bind(scheduling.vaccine_id)
        .bind(scheduling.dose_number)
        .bind(scheduling.scheduled_date)
        .bind(scheduling.status)
        .bind(scheduling.assigned_nurse_id)
        .bind(&scheduling.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("uq_schedulings_active_dose") =>
            {
                AppError::duplicate_dose(scheduling.dose_number)
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create scheduling", e),
        })
    }

    async fn update(&self, scheduling: &VaccineScheduling) -> AppResult<VaccineScheduling> {
        sqlx::query_as::<_, VaccineScheduling>(
            "UPDATE vaccine_schedulings \
             SET scheduled_date = $2, status = $3, assigned_nurse_id = $4, notes = $5, \
                 deleted_at = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(scheduling.id)
        .bind(scheduling.scheduled_date)
        .bind(scheduling.status)
        .bind(scheduling.assigned_nurse_id)
        .bind(&scheduling.notes)
        .bind(scheduling.deleted_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update scheduling", e))?
        .ok_or_else(|| AppError::scheduling_not_found(scheduling.id))
    }

    async fn delete(&self, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE vaccine_schedulings SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete scheduling", e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SchedulingStore for SchedulingRepository {
    async fn find_active_for_dose(
        &self,
        user_id: Uuid,
        vaccine_id: Uuid,
        dose_number: i32,
    ) -> AppResult<Option<VaccineScheduling>> {
        sqlx::query_as::<_, VaccineScheduling>(
            "SELECT * FROM vaccine_schedulings \
             WHERE user_id = $1 AND vaccine_id = $2 AND dose_number = $3 \
               AND status <> 'cancelled'",
        )
        .bind(user_id)
        .bind(vaccine_id)
        .bind(dose_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find active scheduling", e)
        })
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineScheduling>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vaccine_schedulings WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count user schedulings", e)
        })?;

        let schedulings = sqlx::query_as::<_, VaccineScheduling>(
            "SELECT * FROM vaccine_schedulings WHERE user_id = $1 AND deleted_at IS NULL \
             ORDER BY scheduled_date DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list user schedulings", e)
        })?;

        Ok(PageResponse::new(
            schedulings,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn dose_event_date(
        &self,
        user_id: Uuid,
        vaccine_id: Uuid,
        dose_number: i32,
    ) -> AppResult<Option<DateTime<Utc>>> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT COALESCE(a.application_date, s.scheduled_date) \
             FROM vaccine_schedulings s \
             LEFT JOIN vaccine_applications a ON a.scheduling_id = s.id \
             WHERE s.user_id = $1 AND s.vaccine_id = $2 AND s.dose_number = $3 \
               AND s.status <> 'cancelled'",
        )
        .bind(user_id)
        .bind(vaccine_id)
        .bind(dose_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve dose event date", e)
        })
    }
}
