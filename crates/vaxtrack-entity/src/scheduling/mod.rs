//! Vaccine scheduling entity.

pub mod model;
pub mod status;

pub use model::{CreateScheduling, UpdateScheduling, VaccineScheduling};
pub use status::SchedulingStatus;
