//! Dose sequencing validation.

pub mod validator;

pub use validator::DoseValidator;
