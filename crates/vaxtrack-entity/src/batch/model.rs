//! Vaccine batch entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::BatchStatus;

/// A received batch of vaccine units.
///
/// A batch contributes to its vaccine's `total_stock` only while
/// Available. `current_quantity == 0` implies a terminal status
/// (Depleted, Discarded, or Expired); the ledger enforces this on
/// every decrement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VaccineBatch {
    /// Unique batch identifier.
    pub id: Uuid,
    /// The vaccine this batch belongs to.
    pub vaccine_id: Uuid,
    /// Globally unique batch number from the manufacturer.
    pub batch_number: String,
    /// Units received.
    pub initial_quantity: i32,
    /// Units remaining (0 <= current <= initial).
    pub current_quantity: i32,
    /// Last day the batch may be administered (inclusive).
    pub expiration_date: NaiveDate,
    /// Day the batch was received.
    pub received_date: NaiveDate,
    /// Batch status.
    pub status: BatchStatus,
    /// When the batch was created.
    pub created_at: DateTime<Utc>,
    /// When the batch was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl VaccineBatch {
    /// Check if the batch is past its expiration date.
    ///
    /// Expiration is end-of-day inclusive: the batch remains usable
    /// through the whole expiration day.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.date_naive() > self.expiration_date
    }

    /// Check if the batch has units remaining.
    pub fn has_stock(&self) -> bool {
        self.current_quantity > 0
    }

    /// Check if the batch may serve a dose right now.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.status == BatchStatus::Available
            && self.has_stock()
            && !self.is_expired(now)
            && self.deleted_at.is_none()
    }
}

/// Data required to register a new batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatch {
    /// The vaccine the batch belongs to.
    pub vaccine_id: Uuid,
    /// Globally unique batch number.
    pub batch_number: String,
    /// Units received (> 0).
    pub initial_quantity: i32,
    /// Last usable day (inclusive).
    pub expiration_date: NaiveDate,
    /// Day the batch was received.
    pub received_date: NaiveDate,
}
