//! # vaxtrack-database
//!
//! PostgreSQL connection management, store traits describing the
//! persistence seams, and concrete sqlx repository implementations
//! for all VaxTrack entities, including the atomic inventory ledger
//! and the dose-application unit of work.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
