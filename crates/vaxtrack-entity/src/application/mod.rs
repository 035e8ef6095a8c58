//! Vaccine application entity.

pub mod model;

pub use model::{UpdateApplication, VaccineApplication};
