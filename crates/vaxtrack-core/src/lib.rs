//! # vaxtrack-core
//!
//! Core crate for VaxTrack. Contains traits, configuration schemas,
//! domain events, pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other VaxTrack crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorCode, ErrorKind};
pub use result::AppResult;
