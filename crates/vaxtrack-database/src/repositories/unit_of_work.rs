//! Dose-application unit of work.
//!
//! The one place where an application row, a batch decrement, a vaccine
//! aggregate decrement, and a scheduling completion are written — all
//! inside a single transaction. A failure at any step leaves no partial
//! state behind.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use vaxtrack_core::error::{AppError, ErrorKind};
use vaxtrack_core::result::AppResult;
use vaxtrack_entity::scheduling::{SchedulingStatus, VaccineScheduling};

use crate::repositories::ledger::{adjust_vaccine_stock, decrement_batch};
use crate::store::{ApplyDoseOutcome, ApplyDoseWrite, DoseUnitOfWork, SchedulingWrite};

/// sqlx-backed dose unit of work.
#[derive(Debug, Clone)]
pub struct PgDoseUnitOfWork {
    pool: PgPool,
}

impl PgDoseUnitOfWork {
    /// Create a new unit of work over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DoseUnitOfWork for PgDoseUnitOfWork {
    async fn apply_dose(&self, write: ApplyDoseWrite) -> AppResult<ApplyDoseOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Resolve the scheduling first: completing an existing one takes
        // a row lock, so competing applications of the same scheduling
        // serialize here; a synthesized one hits the active-slot unique
        // index, so duplicate walk-ins fail before any stock moves.
        let scheduling = match &write.scheduling {
            SchedulingWrite::Existing(id) => {
                let current = sqlx::query_as::<_, VaccineScheduling>(
                    "SELECT * FROM vaccine_schedulings WHERE id = $1 FOR UPDATE",
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to lock scheduling", e)
                })?
                .ok_or_else(|| AppError::scheduling_not_found(id))?;

                match current.status {
                    SchedulingStatus::Completed => {
                        return Err(AppError::scheduling_already_completed(id));
                    }
                    SchedulingStatus::Cancelled => {
                        return Err(AppError::validation(format!(
                            "Scheduling {id} is cancelled and cannot be applied"
                        )));
                    }
                    SchedulingStatus::Scheduled | SchedulingStatus::Confirmed => {}
                }

                sqlx::query_as::<_, VaccineScheduling>(
                    "UPDATE vaccine_schedulings \
                     SET status = 'completed', updated_at = NOW() \
                     WHERE id = $1 RETURNING *",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to complete scheduling", e)
                })?
            }
            SchedulingWrite::New(scheduling) => sqlx::query_as::<_, VaccineScheduling>(
                "INSERT INTO vaccine_schedulings \
                     (id, user_id, vaccine_id, dose_number, scheduled_date, status, \
                      assigned_nurse_id, notes) \
                 VALUES ($1, $2, $3, $4, $5, 'completed', $6, $7) \
                 RETURNING *",
            )
            .bind(scheduling.id)
            .bind(scheduling.user_id)
            .bind(scheduling.vaccine_id)
            .bind(scheduling.dose_number)
            .bind(scheduling.scheduled_date)
            .bind(scheduling.assigned_nurse_id)
            .bind(&scheduling.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err)
                    if db_err.constraint() == Some("uq_schedulings_active_dose") =>
                {
                    AppError::duplicate_dose(scheduling.dose_number)
                }
                _ => {
                    AppError::with_source(ErrorKind::Database, "Failed to insert scheduling", e)
                }
            })?,
        };

        let mut application = write.application;
        application.scheduling_id = scheduling.id;

        let application = sqlx::query_as::<_, vaxtrack_entity::application::VaccineApplication>(
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
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("vaccine_applications_scheduling_key") =>
            {
                AppError::duplicate_dose(scheduling.dose_number)
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert application", e),
        })?;

        // One dose, one unit. The conditional update raises
        // InsufficientQuantity if a concurrent consumer got there first.
        let batch = decrement_batch(&mut tx, application.batch_id, 1).await?;
        let vaccine_total_stock = adjust_vaccine_stock(&mut tx, batch.vaccine_id, -1).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        info!(
            application_id = %application.id,
            scheduling_id = %scheduling.id,
            batch_id = %batch.id,
            "Dose applied"
        );

        Ok(ApplyDoseOutcome {
            application,
            scheduling,
            batch,
            vaccine_total_stock,
        })
    }
}
