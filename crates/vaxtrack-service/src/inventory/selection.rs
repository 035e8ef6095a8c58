//! Batch selection policies.
//!
//! Read-only suggestion queries for operators picking a batch to
//! administer from. The orchestrator never auto-selects: the caller
//! always supplies the batch explicitly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vaxtrack_core::result::AppResult;
use vaxtrack_database::store::BatchStore;
use vaxtrack_entity::batch::VaccineBatch;

/// Batch consumption ordering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    /// First-In-First-Out: oldest received batch first.
    Fifo,
    /// First-Expired-First-Out: soonest-expiring usable batch first.
    Fefo,
}

/// Suggests a batch for administration.
#[derive(Clone)]
pub struct BatchSelector {
    batches: Arc<dyn BatchStore>,
}

impl BatchSelector {
    /// Creates a new selector over the batch store.
    pub fn new(batches: Arc<dyn BatchStore>) -> Self {
        Self { batches }
    }

    /// Returns the suggested batch under the given strategy, if any
    /// usable batch exists.
    ///
    /// FIFO considers Available batches with units remaining; FEFO
    /// additionally excludes batches already past their expiration day.
    pub async fn suggest(
        &self,
        vaccine_id: Uuid,
        strategy: SelectionStrategy,
        now: DateTime<Utc>,
    ) -> AppResult<Option<VaccineBatch>> {
        match strategy {
            SelectionStrategy::Fifo => self.batches.find_oldest_available(vaccine_id).await,
            SelectionStrategy::Fefo => {
                self.batches
                    .find_soonest_expiring(vaccine_id, now.date_naive())
                    .await
            }
        }
    }
}
