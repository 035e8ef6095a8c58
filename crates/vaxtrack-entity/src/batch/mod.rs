//! Vaccine batch entity.

pub mod model;
pub mod status;

pub use model::{CreateBatch, VaccineBatch};
pub use status::BatchStatus;
