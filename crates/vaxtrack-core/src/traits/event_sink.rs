//! Event sink trait for handing domain events to the notification layer.

use async_trait::async_trait;
use tracing::debug;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Receives domain events for out-of-band delivery.
///
/// Implementations live at the application boundary (notification
/// dispatcher, audit logger). Callers treat dispatch as best-effort:
/// errors are logged by the caller and never abort the operation that
/// produced the event.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Dispatch a single event.
    async fn dispatch(&self, event: DomainEvent) -> AppResult<()>;
}

/// An event sink that logs events at debug level and drops them.
///
/// Used in tests and in deployments without a notification dispatcher.
#[derive(Debug, Clone, Default)]
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn dispatch(&self, event: DomainEvent) -> AppResult<()> {
        debug!(event_id = %event.id, "Dropping domain event (null sink)");
        Ok(())
    }
}
