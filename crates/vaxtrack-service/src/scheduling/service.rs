//! Scheduling lifecycle service.
//!
//! Owns the Scheduled → Confirmed → Completed/Cancelled state machine.
//! Completion is not reachable from here: only the application
//! orchestrator completes a scheduling, inside its unit of work.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use vaxtrack_core::error::AppError;
use vaxtrack_core::events::{DomainEvent, EventChannel, EventPayload, SchedulingEvent};
use vaxtrack_core::result::AppResult;
use vaxtrack_core::traits::EventSink;
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_database::store::{SchedulingStore, UserStore, VaccineStore};
use vaxtrack_entity::scheduling::{
    CreateScheduling, SchedulingStatus, UpdateScheduling, VaccineScheduling,
};
use vaxtrack_entity::user::UserRole;

use crate::access;
use crate::context::RequestContext;
use crate::dose::DoseValidator;

/// Manages the scheduling lifecycle.
#[derive(Clone)]
pub struct SchedulingService {
    users: Arc<dyn UserStore>,
    vaccines: Arc<dyn VaccineStore>,
    schedulings: Arc<dyn SchedulingStore>,
    validator: DoseValidator,
    events: Arc<dyn EventSink>,
}

impl SchedulingService {
    /// Creates a new scheduling service.
    pub fn new(
        users: Arc<dyn UserStore>,
        vaccines: Arc<dyn VaccineStore>,
        schedulings: Arc<dyn SchedulingStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let validator = DoseValidator::new(schedulings.clone());
        Self {
            users,
            vaccines,
            schedulings,
            validator,
            events,
        }
    }

    /// Creates a new scheduling in the Scheduled state.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        data: CreateScheduling,
    ) -> AppResult<VaccineScheduling> {
        if !access::can_create_scheduling_for(ctx, data.user_id) {
            return Err(AppError::forbidden(
                "Only a manager may schedule doses for another user",
            ));
        }

        let receiver = self
            .users
            .find_by_id(data.user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found(data.user_id))?;
        if !receiver.is_active() {
            return Err(AppError::validation("The dose receiver is inactive"));
        }

        if let Some(nurse_id) = data.assigned_nurse_id {
            let nurse = self
                .users
                .find_by_id(nurse_id)
                .await?
                .ok_or_else(|| AppError::user_not_found(nurse_id))?;
            if nurse.role != UserRole::Nurse {
                return Err(AppError::validation(
                    "The assigned user is not a nurse",
                ));
            }
        }

        let vaccine = self
            .vaccines
            .find_by_id(&data.vaccine_id)
            .await?
            .ok_or_else(|| AppError::vaccine_not_found(data.vaccine_id))?;

        if data.scheduled_date <= ctx.request_time {
            return Err(AppError::validation(
                "The scheduled date must be in the future",
            ));
        }

        self.validator
            .validate_sequence(
                receiver.id,
                &vaccine,
                data.dose_number,
                data.scheduled_date,
                None,
            )
            .await?;

        let now = Utc::now();
        let scheduling = VaccineScheduling {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            vaccine_id: data.vaccine_id,
            dose_number: data.dose_number,
            scheduled_date: data.scheduled_date,
            status: SchedulingStatus::Scheduled,
            assigned_nurse_id: data.assigned_nurse_id,
            notes: data.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.schedulings.create(&scheduling).await?;

        info!(
            scheduling_id = %created.id,
            user_id = %created.user_id,
            vaccine_id = %created.vaccine_id,
            dose_number = created.dose_number,
            "Scheduling created"
        );

        self.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Scheduling(SchedulingEvent::Created {
                scheduling_id: created.id,
                user_id: created.user_id,
                vaccine_id: created.vaccine_id,
                dose_number: created.dose_number,
                scheduled_date: created.scheduled_date,
            }),
        )
        .with_channels(vec![EventChannel::Email, EventChannel::InApp]))
        .await;

        Ok(created)
    }

    /// Fetches a scheduling visible to the caller.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<VaccineScheduling> {
        let scheduling = self
            .schedulings
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::scheduling_not_found(id))?;

        if !access::can_view_scheduling(ctx, scheduling.user_id, scheduling.assigned_nurse_id) {
            return Err(AppError::unauthorized_scheduling_access());
        }
        Ok(scheduling)
    }

    /// Lists a user's schedulings. Employees may only list their own.
    pub async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PageResponse<VaccineScheduling>> {
        if ctx.role == UserRole::Employee && ctx.user_id != user_id {
            return Err(AppError::unauthorized_scheduling_access());
        }
        self.schedulings.find_by_user(user_id, &page).await
    }

    /// Confirms a Scheduled scheduling.
    pub async fn confirm(&self, ctx: &RequestContext, id: Uuid) -> AppResult<VaccineScheduling> {
        let mut scheduling = self.fetch_mutable(ctx, id).await?;

        if !scheduling
            .status
            .can_transition_to(SchedulingStatus::Confirmed)
        {
            return Err(AppError::validation(format!(
                "Cannot confirm a scheduling in status {}",
                scheduling.status
            )));
        }

        scheduling.status = SchedulingStatus::Confirmed;
        scheduling.updated_at = Utc::now();
        let updated = self.schedulings.update(&scheduling).await?;

        self.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Scheduling(SchedulingEvent::Confirmed {
                scheduling_id: updated.id,
                user_id: updated.user_id,
            }),
        ))
        .await;

        Ok(updated)
    }

    /// Updates a scheduling's date, assigned nurse, or notes.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        data: UpdateScheduling,
    ) -> AppResult<VaccineScheduling> {
        let mut scheduling = self.fetch_mutable(ctx, data.id).await?;

        if let Some(scheduled_date) = data.scheduled_date {
            // The strictly-future rule applies again on every reschedule.
            if scheduled_date <= ctx.request_time {
                return Err(AppError::validation(
                    "The scheduled date must be in the future",
                ));
            }
            scheduling.scheduled_date = scheduled_date;
        }
        if let Some(nurse_id) = data.assigned_nurse_id {
            let nurse = self
                .users
                .find_by_id(nurse_id)
                .await?
                .ok_or_else(|| AppError::user_not_found(nurse_id))?;
            if nurse.role != UserRole::Nurse {
                return Err(AppError::validation(
                    "The assigned user is not a nurse",
                ));
            }
            scheduling.assigned_nurse_id = Some(nurse_id);
        }
        if let Some(notes) = data.notes {
            scheduling.notes = Some(notes);
        }

        scheduling.updated_at = Utc::now();
        self.schedulings.update(&scheduling).await
    }

    /// Cancels a scheduling (soft delete). Terminal.
    pub async fn cancel(&self, ctx: &RequestContext, id: Uuid) -> AppResult<VaccineScheduling> {
        let mut scheduling = self.fetch_mutable(ctx, id).await?;

        let now = Utc::now();
        scheduling.status = SchedulingStatus::Cancelled;
        scheduling.deleted_at = Some(now);
        scheduling.updated_at = now;
        let cancelled = self.schedulings.update(&scheduling).await?;

        info!(scheduling_id = %cancelled.id, "Scheduling cancelled");

        self.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Scheduling(SchedulingEvent::Cancelled {
                scheduling_id: cancelled.id,
                user_id: cancelled.user_id,
            }),
        ))
        .await;

        Ok(cancelled)
    }

    /// Fetches a scheduling, checking authorization and mutability.
    async fn fetch_mutable(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<VaccineScheduling> {
        let scheduling = self
            .schedulings
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::scheduling_not_found(id))?;

        if !access::can_manage_scheduling(ctx, scheduling.user_id) {
            return Err(AppError::unauthorized_scheduling_access());
        }
        match scheduling.status {
            SchedulingStatus::Completed => Err(AppError::scheduling_already_completed(id)),
            SchedulingStatus::Cancelled => Err(AppError::validation(format!(
                "Scheduling {id} is cancelled and can no longer be modified"
            ))),
            _ => Ok(scheduling),
        }
    }

    /// Best-effort event dispatch; a failure never fails the operation.
    async fn emit(&self, event: DomainEvent) {
        if let Err(e) = self.events.dispatch(event).await {
            warn!(error = %e, "Failed to dispatch scheduling event");
        }
    }
}
