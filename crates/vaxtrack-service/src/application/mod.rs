//! Administered-dose orchestration.

pub mod service;

pub use service::{ApplicationService, ApplicationTarget, CreateApplication};
