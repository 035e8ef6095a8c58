//! Vaccine scheduling entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::SchedulingStatus;

/// An intended or completed dose event for one
/// (user, vaccine, dose number) triple.
///
/// At most one active (non-Cancelled) scheduling exists per triple.
/// Every administered application traces back to exactly one scheduling;
/// walk-ins get a Completed scheduling synthesized at application time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VaccineScheduling {
    /// Unique scheduling identifier.
    pub id: Uuid,
    /// The user receiving the dose.
    pub user_id: Uuid,
    /// The vaccine.
    pub vaccine_id: Uuid,
    /// Dose number within the course (1..=doses_required).
    pub dose_number: i32,
    /// When the dose is scheduled for (strictly future at create/update).
    pub scheduled_date: DateTime<Utc>,
    /// Scheduling status.
    pub status: SchedulingStatus,
    /// Nurse assigned to administer the dose, if any.
    pub assigned_nurse_id: Option<Uuid>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// When the scheduling was created.
    pub created_at: DateTime<Utc>,
    /// When the scheduling was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker (set on cancellation).
    pub deleted_at: Option<DateTime<Utc>>,
}

impl VaccineScheduling {
    /// Check if this scheduling still occupies its dose slot.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Check if this scheduling can still be updated or cancelled.
    pub fn is_mutable(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Data required to create a new scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduling {
    /// The user receiving the dose.
    pub user_id: Uuid,
    /// The vaccine.
    pub vaccine_id: Uuid,
    /// Dose number within the course.
    pub dose_number: i32,
    /// When the dose is scheduled for.
    pub scheduled_date: DateTime<Utc>,
    /// Nurse assigned to administer the dose, if any.
    pub assigned_nurse_id: Option<Uuid>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Data for updating an existing scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduling {
    /// The scheduling ID to update.
    pub id: Uuid,
    /// New scheduled date (re-validated as strictly future).
    pub scheduled_date: Option<DateTime<Utc>>,
    /// New assigned nurse.
    pub assigned_nurse_id: Option<Uuid>,
    /// New notes.
    pub notes: Option<String>,
}
