//! Vaccine entity.

pub mod model;

pub use model::{CreateVaccine, UpdateVaccine, Vaccine};
