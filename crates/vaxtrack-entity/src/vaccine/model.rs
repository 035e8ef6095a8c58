//! Vaccine entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A vaccine in the catalog.
///
/// `total_stock` is a derived aggregate: it always equals the sum of
/// `current_quantity` over this vaccine's non-deleted Available batches.
/// Only the inventory ledger mutates it, and always in the same
/// transaction as the batch change it mirrors.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vaccine {
    /// Unique vaccine identifier.
    pub id: Uuid,
    /// Vaccine name.
    pub name: String,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Number of doses required for a full course (>= 1).
    pub doses_required: i32,
    /// Minimum days between consecutive doses (>= 1 when set).
    pub interval_days: Option<i32>,
    /// Whether the vaccine is mandatory for compliance.
    pub is_obligatory: bool,
    /// Stock level below which a low-stock warning is raised.
    pub min_stock_level: i32,
    /// Aggregate units across Available batches.
    pub total_stock: i32,
    /// When the vaccine was created.
    pub created_at: DateTime<Utc>,
    /// When the vaccine was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Vaccine {
    /// Check if the course consists of more than one dose.
    pub fn is_multi_dose(&self) -> bool {
        self.doses_required > 1
    }

    /// Check if the aggregate stock is below the configured minimum.
    pub fn is_below_min_stock(&self) -> bool {
        self.total_stock < self.min_stock_level
    }
}

/// Data required to create a new vaccine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVaccine {
    /// Vaccine name.
    pub name: String,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Number of doses required (>= 1).
    pub doses_required: i32,
    /// Minimum days between consecutive doses (>= 1 when set).
    pub interval_days: Option<i32>,
    /// Whether the vaccine is mandatory.
    #[serde(default)]
    pub is_obligatory: bool,
    /// Low-stock warning threshold.
    #[serde(default)]
    pub min_stock_level: i32,
}

/// Data for updating a vaccine's mutable policy fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVaccine {
    /// The vaccine ID to update.
    pub id: Uuid,
    /// New required dose count.
    pub doses_required: Option<i32>,
    /// New dose interval. `Some(None)` is not representable here;
    /// the interval can only be changed, not cleared.
    pub interval_days: Option<i32>,
    /// New obligatory flag.
    pub is_obligatory: Option<bool>,
    /// New low-stock threshold.
    pub min_stock_level: Option<i32>,
}
