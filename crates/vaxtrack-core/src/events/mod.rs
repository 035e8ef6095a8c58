//! Domain events emitted by VaxTrack operations.
//!
//! Events are handed to an [`crate::traits::EventSink`] and consumed by the
//! out-of-scope notification dispatcher. Emission is best-effort: a failed
//! dispatch is logged and never fails the operation that produced the event.

pub mod application;
pub mod inventory;
pub mod scheduling;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use application::ApplicationEvent;
pub use inventory::InventoryEvent;
pub use scheduling::SchedulingEvent;

/// Delivery channel hint for the notification dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventChannel {
    /// Email delivery.
    Email,
    /// Mobile/web push delivery.
    Push,
    /// In-app notification feed.
    InApp,
}

/// Priority hint for the notification dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    /// Informational, may be batched.
    Low,
    /// Default priority.
    Normal,
    /// Should be delivered promptly (e.g. low stock warnings).
    High,
}

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
    /// Delivery channels the dispatcher should use.
    pub channels: Vec<EventChannel>,
    /// Delivery priority.
    pub priority: EventPriority,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A scheduling-related event.
    Scheduling(SchedulingEvent),
    /// An application-related event.
    Application(ApplicationEvent),
    /// An inventory-related event.
    Inventory(InventoryEvent),
}

impl DomainEvent {
    /// Create a new domain event with default channels and priority.
    pub fn new(actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
            channels: vec![EventChannel::InApp],
            priority: EventPriority::Normal,
        }
    }

    /// Override the delivery channels.
    pub fn with_channels(mut self, channels: Vec<EventChannel>) -> Self {
        self.channels = channels;
        self
    }

    /// Override the delivery priority.
    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }
}
