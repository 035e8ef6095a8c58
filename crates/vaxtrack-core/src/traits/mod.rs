//! Core trait definitions shared across crates.

pub mod event_sink;
pub mod repository;

pub use event_sink::EventSink;
pub use repository::Repository;
