//! Batch status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a vaccine batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "batch_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// The batch may serve doses and counts toward aggregate stock.
    Available,
    /// The batch passed its expiration date.
    Expired,
    /// The batch was consumed down to zero units.
    Depleted,
    /// The batch was discarded by an operator.
    Discarded,
}

impl BatchStatus {
    /// Check whether batches in this status count toward
    /// the vaccine's aggregate stock.
    pub fn counts_toward_stock(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Expired => "expired",
            Self::Depleted => "depleted",
            Self::Discarded => "discarded",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
