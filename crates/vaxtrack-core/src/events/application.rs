//! Application-related domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to administered doses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApplicationEvent {
    /// A dose was administered and recorded.
    Recorded {
        /// The application ID.
        application_id: Uuid,
        /// The scheduling the application completes.
        scheduling_id: Uuid,
        /// The user who received the dose.
        user_id: Uuid,
        /// The vaccine.
        vaccine_id: Uuid,
        /// The dose number.
        dose_number: i32,
        /// The consumed batch.
        batch_id: Uuid,
        /// The administering nurse.
        applied_by: Uuid,
        /// When the dose was administered.
        application_date: DateTime<Utc>,
    },
}
