//! Scheduling status enumeration and transition rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a vaccine scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scheduling_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SchedulingStatus {
    /// Initial state after creation.
    Scheduled,
    /// Confirmed by the user or a nurse.
    Confirmed,
    /// A dose was administered against this scheduling. Terminal.
    Completed,
    /// Cancelled before administration. Terminal.
    Cancelled,
}

impl SchedulingStatus {
    /// Check if the scheduling is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Check if the scheduling still occupies its
    /// (user, vaccine, dose number) slot.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Check whether a transition to `next` is permitted.
    ///
    /// Completion happens only through the application orchestrator;
    /// cancellation is allowed from any non-terminal state.
    pub fn can_transition_to(&self, next: SchedulingStatus) -> bool {
        match (self, next) {
            (Self::Scheduled, Self::Confirmed) => true,
            (Self::Scheduled | Self::Confirmed, Self::Completed) => true,
            (Self::Scheduled | Self::Confirmed, Self::Cancelled) => true,
            _ => false,
        }
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SchedulingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
