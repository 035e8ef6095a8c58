//! # vaxtrack-service
//!
//! Business logic services for VaxTrack. This crate holds the rules
//! that decide whether a dose may be scheduled or administered, and
//! orchestrates the stores so that stock counts stay consistent with
//! batch consumption:
//!
//! - [`access`] — role-scoped visibility and mutation rules.
//! - [`dose`] — the dose sequencing validator shared by the scheduling
//!   and application paths.
//! - [`scheduling`] — the scheduling lifecycle state machine.
//! - [`inventory`] — vaccine catalog, batch lifecycle, and FIFO/FEFO
//!   batch suggestion.
//! - [`application`] — the orchestrator producing administered-dose
//!   records with exactly one stock decrement each.

pub mod access;
pub mod application;
pub mod context;
pub mod dose;
pub mod inventory;
pub mod scheduling;

pub use context::RequestContext;
