//! Inventory-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to vaccine batch inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InventoryEvent {
    /// A new batch was registered.
    BatchRegistered {
        /// The batch ID.
        batch_id: Uuid,
        /// The parent vaccine.
        vaccine_id: Uuid,
        /// The globally unique batch number.
        batch_number: String,
        /// Units received.
        initial_quantity: i32,
    },
    /// A batch reached zero quantity.
    BatchDepleted {
        /// The batch ID.
        batch_id: Uuid,
        /// The parent vaccine.
        vaccine_id: Uuid,
    },
    /// A batch was discarded by an operator.
    BatchDiscarded {
        /// The batch ID.
        batch_id: Uuid,
        /// The parent vaccine.
        vaccine_id: Uuid,
        /// Units discarded.
        discarded_quantity: i32,
    },
    /// A vaccine's aggregate stock dropped below its minimum level.
    LowStock {
        /// The vaccine ID.
        vaccine_id: Uuid,
        /// Current aggregate stock.
        total_stock: i32,
        /// Configured minimum stock level.
        min_stock_level: i32,
    },
}
