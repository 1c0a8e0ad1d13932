//! Event system for store progress
//!
//! This module provides an in-process event bus that distributes store
//! events (load/create/remove started, finished, failed) to subscribers
//! without blocking the store.
//!
//! # Architecture
//!
//! The event bus uses `tokio::sync::broadcast` for multi-subscriber support.
//! If no subscribers exist, events are dropped immediately. Subscribers can
//! lag without blocking emitters.
//!
//! # Example
//!
//! ```no_run
//! use libaddrbook::service::events::{EventBus, Event};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::LoadStarted);
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Address, AddressId};

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Event bus for distributing store events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the specified capacity
    ///
    /// The capacity determines how many events can be buffered per subscriber
    /// before older events are dropped (if the subscriber is lagging).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Non-blocking. If no subscribers exist, the event is dropped.
    pub fn emit(&self, event: Event) {
        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Events emitted by `AddressStore` operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Full fetch issued
    LoadStarted,

    /// Full fetch applied
    Loaded {
        /// Number of addresses now in the collection
        count: usize,
    },

    /// Full fetch failed, collection unchanged
    LoadFailed { error: String },

    /// Create request issued
    CreateStarted {
        /// Correlates the events of one create call
        op_id: String,
    },

    /// Created address appended to the collection
    Created { op_id: String, address: Address },

    /// Create failed, collection unchanged
    CreateFailed { op_id: String, error: String },

    /// Delete request issued for `id`
    RemoveStarted { id: AddressId },

    /// `id` removed from the collection
    Removed { id: AddressId },

    /// Delete failed, row back to present
    RemoveFailed { id: AddressId, error: String },
}

impl Event {
    /// True for events that end an operation
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Event::LoadStarted | Event::CreateStarted { .. } | Event::RemoveStarted { .. }
        )
    }

    /// Error message carried by failure events
    pub fn error(&self) -> Option<&str> {
        match self {
            Event::LoadFailed { error }
            | Event::CreateFailed { error, .. }
            | Event::RemoveFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(Event::Loaded { count: 3 });

        let received = receiver.recv().await.unwrap();
        assert_eq!(received, Event::Loaded { count: 3 });
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.emit(Event::RemoveStarted { id: 4 });

        assert_eq!(receiver1.recv().await.unwrap(), Event::RemoveStarted { id: 4 });
        assert_eq!(receiver2.recv().await.unwrap(), Event::RemoveStarted { id: 4 });
        assert_eq!(event_bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let event_bus = EventBus::new(10);

        // Should not panic or block
        event_bus.emit(Event::LoadStarted);

        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::RemoveFailed {
            id: 9,
            error: "Address 9 not found".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "remove_failed");
        assert_eq!(json["id"], 9);

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_terminal_events() {
        assert!(!Event::LoadStarted.is_terminal());
        assert!(!Event::RemoveStarted { id: 1 }.is_terminal());
        assert!(Event::Loaded { count: 0 }.is_terminal());
        assert!(Event::RemoveFailed {
            id: 1,
            error: "x".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_error_accessor() {
        let failed = Event::CreateFailed {
            op_id: "op".to_string(),
            error: "Server returned 500: boom".to_string(),
        };
        assert_eq!(failed.error(), Some("Server returned 500: boom"));
        assert_eq!(Event::Removed { id: 2 }.error(), None);
    }
}
