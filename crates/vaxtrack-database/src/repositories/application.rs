//! Application repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use vaxtrack_core::error::{AppError, ErrorKind};
use vaxtrack_core::result::AppResult;
use vaxtrack_core::traits::Repository;
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_entity::application::VaccineApplication;

use crate::store::{ApplicationFilter, ApplicationStore};

/// Repository for administered-dose records.
///
/// Inserts happen only inside the dose unit of work; `create` here
/// exists for the generic contract and test fixtures. `update` touches
/// the annotation fields only.
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    /// Create a new application repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<VaccineApplication, Uuid> for ApplicationRepository {
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<VaccineApplication>> {
        sqlx::query_as::<_, VaccineApplication>("SELECT * FROM vaccine_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find application by id", e)
            })
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<VaccineApplication>> {
        self.find_filtered(&ApplicationFilter::default(), page).await
    }

    async fn create(&self, application: &VaccineApplication) -> AppResult<VaccineApplication> {
        sqlx::query_as::<_, VaccineApplication>(
            "INSERT INTO vaccine_applications \
                 (id, scheduling_id, batch_id, applied_by, application_date, \
                  application_site, observations) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(application.id)
        .bind(application.scheduling_id)
        .bind(application.batch_id)
        .bind(application.applied_by)
        .bind(application.application_date)
        .bind(&application.application_site)
        .bind(&application.observations)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("vaccine_applications_scheduling_key") =>
            {
                AppError::conflict("An application already completes this scheduling")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create application", e),
        })
    }

    async fn update(&self, application: &VaccineApplication) -> AppResult<VaccineApplication> {
        sqlx::query_as::<_, VaccineApplication>(
            "UPDATE vaccine_applications \
             SET application_site = $2, observations = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(application.id)
        .bind(&application.application_site)
        .bind(&application.observations)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update application", e)
        })?
        .ok_or_else(|| AppError::application_not_found(application.id))
    }

    async fn delete(&self, _id: &Uuid) -> AppResult<bool> {
        // Application records are immutable history; they are never deleted.
        Err(AppError::validation(
            "Application records cannot be deleted",
        ))
    }
}

#[async_trait]
impl ApplicationStore for ApplicationRepository {
    async fn find_by_scheduling(
        &self,
        scheduling_id: Uuid,
    ) -> AppResult<Option<VaccineApplication>> {
        sqlx::query_as::<_, VaccineApplication>(
            "SELECT * FROM vaccine_applications WHERE scheduling_id = $1",
        )
        .bind(scheduling_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find application by scheduling",
                e,
            )
        })
    }

    async fn find_filtered(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineApplication>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vaccine_applications a \
             JOIN vaccine_schedulings s ON s.id = a.scheduling_id \
             WHERE ($1::uuid IS NULL OR s.user_id = $1) \
               AND ($2::uuid IS NULL OR s.vaccine_id = $2) \
               AND ($3::uuid IS NULL OR a.applied_by = $3)",
        )
        .bind(filter.user_id)
        .bind(filter.vaccine_id)
        .bind(filter.applied_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count applications", e)
        })?;

        let applications = sqlx::query_as::<_, VaccineApplication>(
            "SELECT a.* FROM vaccine_applications a \
             JOIN vaccine_schedulings s ON s.id = a.scheduling_id \
             WHERE ($1::uuid IS NULL OR s.user_id = $1) \
               AND ($2::uuid IS NULL OR s.vaccine_id = $2) \
               AND ($3::uuid IS NULL OR a.applied_by = $3) \
             ORDER BY a.application_date DESC LIMIT $4 OFFSET $5",
        )
        .bind(filter.user_id)
        .bind(filter.vaccine_id)
        .bind(filter.applied_by)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list applications", e)
        })?;

        Ok(PageResponse::new(
            applications,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
