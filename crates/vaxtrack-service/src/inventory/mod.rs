//! Vaccine catalog and batch inventory.

pub mod selection;
pub mod service;

pub use selection::{BatchSelector, SelectionStrategy};
pub use service::InventoryService;
