//! Scheduling-related domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to vaccine scheduling lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SchedulingEvent {
    /// A scheduling was created.
    Created {
        /// The scheduling ID.
        scheduling_id: Uuid,
        /// The user receiving the dose.
        user_id: Uuid,
        /// The vaccine.
        vaccine_id: Uuid,
        /// The dose number.
        dose_number: i32,
        /// When the dose is scheduled for.
        scheduled_date: DateTime<Utc>,
    },
    /// A scheduling was confirmed.
    Confirmed {
        /// The scheduling ID.
        scheduling_id: Uuid,
        /// The user receiving the dose.
        user_id: Uuid,
    },
    /// A scheduling was cancelled.
    Cancelled {
        /// The scheduling ID.
        scheduling_id: Uuid,
        /// The user the dose was scheduled for.
        user_id: Uuid,
    },
    /// A scheduling was completed by a recorded application.
    Completed {
        /// The scheduling ID.
        scheduling_id: Uuid,
        /// The user who received the dose.
        user_id: Uuid,
        /// The application that completed it.
        application_id: Uuid,
    },
}
