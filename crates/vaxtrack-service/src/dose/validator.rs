//! The dose sequencing validator.
//!
//! One ordered list of checks shared by the scheduling-creation path
//! and both application paths. The order is part of the contract: it
//! defines tie-break precedence (duplicate detection always precedes
//! sequence-gap detection, which precedes interval checking), so the
//! paths must never diverge.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use vaxtrack_core::error::AppError;
use vaxtrack_core::result::AppResult;
use vaxtrack_database::store::SchedulingStore;
use vaxtrack_entity::batch::{BatchStatus, VaccineBatch};
use vaxtrack_entity::scheduling::SchedulingStatus;
use vaxtrack_entity::user::User;
use vaxtrack_entity::vaccine::Vaccine;

/// Validates dose ordering, spacing, and administration preconditions.
#[derive(Clone)]
pub struct DoseValidator {
    schedulings: Arc<dyn SchedulingStore>,
}

impl DoseValidator {
    /// Creates a new validator over the scheduling store.
    pub fn new(schedulings: Arc<dyn SchedulingStore>) -> Self {
        Self { schedulings }
    }

    /// Full administration validation, in contract order:
    ///
    /// 1. Applicator is an active nurse distinct from the receiver;
    ///    the receiver is active.
    /// 2. The batch belongs to the vaccine.
    /// 3. The batch is Available.
    /// 4. The batch has units remaining.
    /// 5. The batch is not past its expiration day.
    /// 6.–9. The sequence tail ([`Self::validate_sequence`]).
    ///
    /// `exclude_scheduling` names the scheduling being completed on the
    /// scheduled path; the duplicate check ignores that row (it *is*
    /// the dose event in the slot) unless it is already Completed.
    ///
    /// Read-only: no check writes anything.
    pub async fn validate_administration(
        &self,
        applicator: &User,
        receiver: &User,
        batch: &VaccineBatch,
        vaccine: &Vaccine,
        dose_number: i32,
        now: DateTime<Utc>,
        exclude_scheduling: Option<Uuid>,
    ) -> AppResult<()> {
        validate_participants(applicator, receiver)?;
        validate_batch(batch, vaccine, now)?;
        self.validate_sequence(receiver.id, vaccine, dose_number, now, exclude_scheduling)
            .await
    }

    /// The sequence tail shared with scheduling creation:
    ///
    /// 6. `dose_number` within the vaccine's required dose count.
    /// 7. No dose event already occupies the slot.
    /// 8. For dose N > 1, dose N-1 exists.
    /// 9. For dose N > 1 with an interval policy, at least
    ///    `interval_days` whole days elapsed since the prior dose.
    ///
    /// `reference` is "now" for administration and the requested
    /// scheduled date for scheduling creation, so a scheduling cannot
    /// be placed inside the interval window either.
    pub async fn validate_sequence(
        &self,
        receiver_id: Uuid,
        vaccine: &Vaccine,
        dose_number: i32,
        reference: DateTime<Utc>,
        exclude_scheduling: Option<Uuid>,
    ) -> AppResult<()> {
        if dose_number < 1 {
            return Err(AppError::validation("Dose number must be at least 1"));
        }
        if dose_number > vaccine.doses_required {
            return Err(AppError::exceeded_required_doses(
                dose_number,
                vaccine.doses_required,
            ));
        }

        if let Some(existing) = self
            .schedulings
            .find_active_for_dose(receiver_id, vaccine.id, dose_number)
            .await?
        {
            let is_own_slot = exclude_scheduling == Some(existing.id)
                && existing.status != SchedulingStatus::Completed;
            if !is_own_slot {
                return Err(AppError::duplicate_dose(dose_number));
            }
        }

        if dose_number > 1 {
            let prior = self
                .schedulings
                .find_active_for_dose(receiver_id, vaccine.id, dose_number - 1)
                .await?;
            if prior.is_none() {
                return Err(AppError::invalid_dose_sequence(dose_number));
            }

            if let Some(interval_days) = vaccine.interval_days {
                let prior_date = self
                    .schedulings
                    .dose_event_date(receiver_id, vaccine.id, dose_number - 1)
                    .await?
                    .ok_or_else(|| AppError::invalid_dose_sequence(dose_number))?;

                // Whole-day truncation of the elapsed duration.
                let elapsed_days = (reference - prior_date).num_days();
                if elapsed_days < i64::from(interval_days) {
                    return Err(AppError::minimum_interval_not_met(
                        i64::from(interval_days),
                        elapsed_days,
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Check 1: applicator and receiver identity and state.
fn validate_participants(applicator: &User, receiver: &User) -> AppResult<()> {
    if !applicator.is_nurse() {
        return Err(AppError::validation(
            "Only a nurse may administer vaccine doses",
        ));
    }
    if applicator.id == receiver.id {
        return Err(AppError::validation(
            "The administering nurse cannot be the dose receiver",
        ));
    }
    if !applicator.is_active() {
        return Err(AppError::validation("The administering nurse is inactive"));
    }
    if !receiver.is_active() {
        return Err(AppError::validation("The dose receiver is inactive"));
    }
    Ok(())
}

/// Checks 2–5: the batch can physically serve this vaccine right now.
fn validate_batch(batch: &VaccineBatch, vaccine: &Vaccine, now: DateTime<Utc>) -> AppResult<()> {
    if batch.vaccine_id != vaccine.id {
        return Err(AppError::validation(format!(
            "Batch {} does not belong to vaccine {}",
            batch.batch_number, vaccine.name
        )));
    }
    if batch.status != BatchStatus::Available {
        return Err(AppError::batch_not_available(format!(
            "status is {}",
            batch.status
        )));
    }
    if !batch.has_stock() {
        return Err(AppError::batch_not_available("no units remaining"));
    }
    if batch.is_expired(now) {
        return Err(AppError::batch_not_available("expired"));
    }
    Ok(())
}
