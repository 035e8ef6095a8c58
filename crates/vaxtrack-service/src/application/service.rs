//! Application orchestrator.
//!
//! Produces administered-dose records. Both entry paths run the same
//! validation in the same order and finish in the dose unit of work,
//! so every application is paired with exactly one stock decrement
//! and exactly one completed scheduling — or nothing at all.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use vaxtrack_core::error::AppError;
use vaxtrack_core::events::{
    ApplicationEvent, DomainEvent, EventChannel, EventPayload, EventPriority, InventoryEvent,
    SchedulingEvent,
};
use vaxtrack_core::result::AppResult;
use vaxtrack_core::traits::EventSink;
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_database::store::{
    ApplicationFilter, ApplicationStore, ApplyDoseWrite, BatchStore, DoseUnitOfWork,
    SchedulingStore, SchedulingWrite, UserStore, VaccineStore,
};
use vaxtrack_entity::application::{UpdateApplication, VaccineApplication};
use vaxtrack_entity::scheduling::{SchedulingStatus, VaccineScheduling};
use vaxtrack_entity::user::User;

use crate::access;
use crate::context::RequestContext;
use crate::dose::DoseValidator;

/// Which dose a new application records.
///
/// Resolved before orchestration: there is no optional-field shape to
/// re-validate downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApplicationTarget {
    /// Complete an existing scheduling.
    Scheduled {
        /// The scheduling to complete.
        scheduling_id: Uuid,
    },
    /// Record an unscheduled walk-in dose.
    WalkIn {
        /// The user receiving the dose.
        user_id: Uuid,
        /// The vaccine.
        vaccine_id: Uuid,
        /// The dose number within the course.
        dose_number: i32,
    },
}

/// Input for recording an administered dose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplication {
    /// Which dose is being recorded.
    pub target: ApplicationTarget,
    /// The batch the dose was drawn from (never auto-selected).
    pub batch_id: Uuid,
    /// The administering nurse. Defaults to the caller; recording on
    /// behalf of another nurse requires a manager.
    pub applied_by: Option<Uuid>,
    /// Anatomical site of administration.
    pub application_site: Option<String>,
    /// Free-form clinical observations.
    pub observations: Option<String>,
}

/// Orchestrates administered-dose creation and access to the records.
#[derive(Clone)]
pub struct ApplicationService {
    users: Arc<dyn UserStore>,
    vaccines: Arc<dyn VaccineStore>,
    batches: Arc<dyn BatchStore>,
    schedulings: Arc<dyn SchedulingStore>,
    applications: Arc<dyn ApplicationStore>,
    unit_of_work: Arc<dyn DoseUnitOfWork>,
    validator: DoseValidator,
    events: Arc<dyn EventSink>,
}

impl ApplicationService {
    /// Creates a new application service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserStore>,
        vaccines: Arc<dyn VaccineStore>,
        batches: Arc<dyn BatchStore>,
        schedulings: Arc<dyn SchedulingStore>,
        applications: Arc<dyn ApplicationStore>,
        unit_of_work: Arc<dyn DoseUnitOfWork>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let validator = DoseValidator::new(schedulings.clone());
        Self {
            users,
            vaccines,
            batches,
            schedulings,
            applications,
            unit_of_work,
            validator,
            events,
        }
    }

    /// Records an administered dose.
    ///
    /// Validation is read-only and fail-fast; the writes happen in the
    /// unit of work, which re-guards the batch quantity and the slot
    /// uniqueness so concurrent requests cannot overdraw or duplicate.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        data: CreateApplication,
    ) -> AppResult<VaccineApplication> {
        let applicator = self.resolve_applicator(ctx, data.applied_by).await?;

        // Resolve the target into (receiver, vaccine, dose) facts.
        let (receiver_id, vaccine_id, dose_number, scheduling) = match &data.target {
            ApplicationTarget::Scheduled { scheduling_id } => {
                let scheduling = self
                    .schedulings
                    .find_by_id(scheduling_id)
                    .await?
                    .ok_or_else(|| AppError::scheduling_not_found(scheduling_id))?;

                match scheduling.status {
                    SchedulingStatus::Completed => {
                        return Err(AppError::scheduling_already_completed(scheduling.id));
                    }
                    SchedulingStatus::Cancelled => {
                        return Err(AppError::validation(format!(
                            "Scheduling {} is cancelled and cannot be applied",
                            scheduling.id
                        )));
                    }
                    SchedulingStatus::Scheduled | SchedulingStatus::Confirmed => {}
                }

                (
                    scheduling.user_id,
                    scheduling.vaccine_id,
                    scheduling.dose_number,
                    Some(scheduling),
                )
            }
            ApplicationTarget::WalkIn {
                user_id,
                vaccine_id,
                dose_number,
            } => (*user_id, *vaccine_id, *dose_number, None),
        };

        let receiver = self
            .users
            .find_by_id(receiver_id)
            .await?
            .ok_or_else(|| AppError::user_not_found(receiver_id))?;
        let vaccine = self
            .vaccines
            .find_by_id(&vaccine_id)
            .await?
            .ok_or_else(|| AppError::vaccine_not_found(vaccine_id))?;
        let batch = self
            .batches
            .find_by_id(data.batch_id)
            .await?
            .ok_or_else(|| AppError::batch_not_found(data.batch_id))?;

        self.validator
            .validate_administration(
                &applicator,
                &receiver,
                &batch,
                &vaccine,
                dose_number,
                ctx.request_time,
                scheduling.as_ref().map(|s| s.id),
            )
            .await?;

        let now = Utc::now();
        let scheduling_write = match &scheduling {
            Some(s) => SchedulingWrite::Existing(s.id),
            // Walk-in: synthesize a completed scheduling so the history
            // invariant (every application traces to a scheduling) holds.
            None => SchedulingWrite::New(VaccineScheduling {
                id: Uuid::new_v4(),
                user_id: receiver.id,
                vaccine_id: vaccine.id,
                dose_number,
                scheduled_date: now,
                status: SchedulingStatus::Completed,
                assigned_nurse_id: Some(applicator.id),
                notes: None,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            }),
        };

        let application = VaccineApplication {
            id: Uuid::new_v4(),
            // Overwritten by the unit of work for the walk-in path.
            scheduling_id: scheduling.as_ref().map(|s| s.id).unwrap_or(Uuid::nil()),
            batch_id: batch.id,
            applied_by: applicator.id,
            application_date: now,
            application_site: data.application_site,
            observations: data.observations,
            created_at: now,
            updated_at: now,
        };

        let outcome = self
            .unit_of_work
            .apply_dose(ApplyDoseWrite {
                application,
                scheduling: scheduling_write,
            })
            .await?;

        info!(
            application_id = %outcome.application.id,
            user_id = %receiver.id,
            vaccine_id = %vaccine.id,
            dose_number,
            batch_id = %batch.id,
            "Dose recorded"
        );

        self.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Application(ApplicationEvent::Recorded {
                application_id: outcome.application.id,
                scheduling_id: outcome.scheduling.id,
                user_id: receiver.id,
                vaccine_id: vaccine.id,
                dose_number,
                batch_id: batch.id,
                applied_by: applicator.id,
                application_date: outcome.application.application_date,
            }),
        )
        .with_channels(vec![EventChannel::Email, EventChannel::InApp]))
        .await;

        self.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Scheduling(SchedulingEvent::Completed {
                scheduling_id: outcome.scheduling.id,
                user_id: receiver.id,
                application_id: outcome.application.id,
            }),
        ))
        .await;

        if outcome.batch.current_quantity == 0 {
            self.emit(DomainEvent::new(
                Some(ctx.user_id),
                EventPayload::Inventory(InventoryEvent::BatchDepleted {
                    batch_id: outcome.batch.id,
                    vaccine_id: vaccine.id,
                }),
            ))
            .await;
        }
        if outcome.vaccine_total_stock < vaccine.min_stock_level {
            self.emit(
                DomainEvent::new(
                    Some(ctx.user_id),
                    EventPayload::Inventory(InventoryEvent::LowStock {
                        vaccine_id: vaccine.id,
                        total_stock: outcome.vaccine_total_stock,
                        min_stock_level: vaccine.min_stock_level,
                    }),
                )
                .with_channels(vec![EventChannel::Email, EventChannel::InApp])
                .with_priority(EventPriority::High),
            )
            .await;
        }

        Ok(outcome.application)
    }

    /// Fetches an application visible to the caller.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<VaccineApplication> {
        let application = self
            .applications
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::application_not_found(id))?;

        let owner_id = self.owner_of(&application).await?;
        if !access::can_view_application(ctx, owner_id, application.applied_by) {
            return Err(AppError::forbidden(
                "You may not view this application record",
            ));
        }
        Ok(application)
    }

    /// Corrects an application's annotation fields (site, observations).
    ///
    /// Only the administering nurse or a manager; the administered
    /// facts themselves are immutable.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        data: UpdateApplication,
    ) -> AppResult<VaccineApplication> {
        let mut application = self
            .applications
            .find_by_id(&data.id)
            .await?
            .ok_or_else(|| AppError::application_not_found(data.id))?;

        if !access::can_update_application(ctx, application.applied_by) {
            return Err(AppError::forbidden(
                "Only the administering nurse or a manager may correct this record",
            ));
        }

        if let Some(site) = data.application_site {
            application.application_site = Some(site);
        }
        if let Some(observations) = data.observations {
            application.observations = Some(observations);
        }
        application.updated_at = Utc::now();

        self.applications.update(&application).await
    }

    /// Lists applications, scoped to what the caller may see.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: ApplicationFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<VaccineApplication>> {
        let filter = access::scope_application_filter(ctx, filter);
        self.applications.find_filtered(&filter, &page).await
    }

    /// Resolves and authorizes the administering nurse.
    async fn resolve_applicator(
        &self,
        ctx: &RequestContext,
        applied_by: Option<Uuid>,
    ) -> AppResult<User> {
        let applicator_id = applied_by.unwrap_or(ctx.user_id);
        if applicator_id != ctx.user_id && !ctx.is_manager() {
            return Err(AppError::forbidden(
                "Only a manager may record a dose on behalf of another nurse",
            ));
        }
        self.users
            .find_by_id(applicator_id)
            .await?
            .ok_or_else(|| AppError::user_not_found(applicator_id))
    }

    /// The receiving user of an application, joined through its
    /// scheduling.
    async fn owner_of(&self, application: &VaccineApplication) -> AppResult<Uuid> {
        let scheduling = self
            .schedulings
            .find_by_id(&application.scheduling_id)
            .await?
            .ok_or_else(|| AppError::scheduling_not_found(application.scheduling_id))?;
        Ok(scheduling.user_id)
    }

    /// Best-effort event dispatch; a failure never fails the operation.
    async fn emit(&self, event: DomainEvent) {
        if let Err(e) = self.events.dispatch(event).await {
            warn!(error = %e, "Failed to dispatch application event");
        }
    }
}
