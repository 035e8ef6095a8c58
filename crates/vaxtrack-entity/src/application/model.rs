//! Vaccine application entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The immutable record that a specific dose was physically administered.
///
/// An application has no direct `user_id`: the receiving user is reached
/// through the scheduling it completes. Creating an application is the
/// single event that decrements batch and vaccine stock, exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VaccineApplication {
    /// Unique application identifier.
    pub id: Uuid,
    /// The scheduling this application completes (1:1).
    pub scheduling_id: Uuid,
    /// The batch the dose was drawn from.
    pub batch_id: Uuid,
    /// The nurse who administered the dose.
    pub applied_by: Uuid,
    /// When the dose was administered.
    pub application_date: DateTime<Utc>,
    /// Anatomical site of administration.
    pub application_site: Option<String>,
    /// Free-form clinical observations.
    pub observations: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Post-hoc corrections to an application record.
///
/// Only the annotation fields may change; the administered facts
/// (scheduling, batch, nurse, date) are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplication {
    /// The application ID to update.
    pub id: Uuid,
    /// New application site.
    pub application_site: Option<String>,
    /// New observations.
    pub observations: Option<String>,
}
