//! Scheduling lifecycle.

pub mod service;

pub use service::SchedulingService;
