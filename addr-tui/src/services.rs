//! Service layer adapter for the TUI
//!
//! Bridges the async `AddressStore` and the synchronous TUI event loop.
//!
//! # Architecture
//!
//! - `ServiceHandle` owns the store, a tokio runtime and a `ScopeGuard`
//! - `load`, `create`, `remove` spawn store operations and return at once
//! - Store events are forwarded from the tokio broadcast channel to a
//!   crossbeam channel the event loop drains every frame
//! - Dropping the handle cancels in-flight requests
//!
//! # Example
//!
//! ```no_run
//! use addr_tui::services::ServiceHandle;
//! use libaddrbook::Config;
//!
//! # fn example() -> addr_tui::error::Result<()> {
//! let services = ServiceHandle::new(&Config::load()?)?;
//! let events = services.subscribe();
//!
//! services.load();
//!
//! if let Ok(event) = events.try_recv() {
//!     // Handle event
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use libaddrbook::service::events::Event;
use libaddrbook::service::lifetime::ScopeGuard;
use libaddrbook::{AddressApi, AddressCollection, AddressDraft, AddressId, AddressStore, Config};
use tokio::sync::broadcast::error::RecvError;

use crate::app::Action;
use crate::error::Result;

/// Service handle for TUI operations
pub struct ServiceHandle {
    store: AddressStore,
    // Declared before `runtime` so the store is cancelled before the runtime shuts down
    _scope: ScopeGuard,
    runtime: tokio::runtime::Runtime,
}

impl ServiceHandle {
    /// Create a handle talking to the configured address service
    ///
    /// # Errors
    ///
    /// Returns an error if the tokio runtime or the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let store = AddressStore::from_config(&config.api)?;
        Self::with_store(store)
    }

    /// Create a handle over any `AddressApi`
    pub fn with_api(api: Arc<dyn AddressApi>) -> Result<Self> {
        Self::with_store(AddressStore::new(api))
    }

    fn with_store(store: AddressStore) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        Ok(Self {
            _scope: store.scope(),
            store,
            runtime,
        })
    }

    /// Subscribe to store events
    ///
    /// Subscribe before starting operations; events emitted earlier are not
    /// replayed.
    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = unbounded();
        let mut event_rx = self.store.subscribe();

        self.runtime.spawn(async move {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Event receiver lagged, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        rx
    }

    // The store logs failures at error level and emits them as events;
    // these task results are only traced.

    /// Start a full reload
    pub fn load(&self) {
        let store = self.store.clone();
        self.runtime.spawn(async move {
            if let Err(e) = store.load().await {
                tracing::debug!("Load finished with error: {}", e);
            }
        });
    }

    /// Start creating `draft`
    pub fn create(&self, draft: AddressDraft) {
        let store = self.store.clone();
        self.runtime.spawn(async move {
            if let Err(e) = store.create(&draft).await {
                tracing::debug!("Create finished with error: {}", e);
            }
        });
    }

    /// Start removing `id`
    pub fn remove(&self, id: AddressId) {
        let store = self.store.clone();
        self.runtime.spawn(async move {
            match store.remove(id).await {
                Ok(outcome) => tracing::debug!("Remove of {} finished: {:?}", id, outcome),
                Err(e) => tracing::debug!("Remove of {} finished with error: {}", id, e),
            }
        });
    }

    /// Current collection, for the reducer
    pub fn snapshot(&self) -> AddressCollection {
        self.store.snapshot()
    }

    /// Endpoint description for the title bar
    pub fn endpoint(&self) -> String {
        self.store.endpoint()
    }
}

/// Translate a store event into the action the reducer should see
///
/// Start events carry nothing the UI needs beyond the collection resync.
pub fn event_action(event: Event) -> Option<Action> {
    match event {
        Event::LoadStarted => Some(Action::SetStatus("Loading addresses...".to_string())),
        Event::Loaded { count } => Some(Action::SetStatus(format!("Loaded {} addresses", count))),
        Event::LoadFailed { error } => {
            Some(Action::ShowError(format!("Error fetching addresses: {}", error)))
        }
        Event::CreateStarted { .. } => None,
        Event::Created { address, .. } => Some(Action::SubmitSucceeded(address)),
        Event::CreateFailed { error, .. } => Some(Action::SubmitFailed(error)),
        Event::RemoveStarted { .. } => None,
        Event::Removed { id } => Some(Action::SetStatus(format!("Removed address #{}", id))),
        Event::RemoveFailed { id, error } => Some(Action::ShowError(format!(
            "Error deleting address #{}: {}",
            id, error
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libaddrbook::Address;

    #[test]
    fn test_event_action_mapping() {
        let address = Address {
            id: 7,
            name: "Bo".to_string(),
            street: "1 Rd".to_string(),
            city: "X".to_string(),
            state: "Y".to_string(),
            zip: "0".to_string(),
        };

        assert!(event_action(Event::CreateStarted {
            op_id: "x".to_string()
        })
        .is_none());
        assert!(matches!(
            event_action(Event::Created {
                op_id: "x".to_string(),
                address
            }),
            Some(Action::SubmitSucceeded(ref a)) if a.id == 7
        ));
        assert!(matches!(
            event_action(Event::RemoveFailed {
                id: 3,
                error: "boom".to_string()
            }),
            Some(Action::ShowError(ref m)) if m == "Error deleting address #3: boom"
        ));
    }
}
