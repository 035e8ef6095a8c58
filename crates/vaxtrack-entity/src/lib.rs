//! # vaxtrack-entity
//!
//! Domain entity models and enums for VaxTrack: users, vaccines,
//! vaccine batches, schedulings, and administered applications.

pub mod application;
pub mod batch;
pub mod scheduling;
pub mod user;
pub mod vaccine;
