//! Address store: the synchronized, authoritative local collection
//!
//! `AddressStore` keeps an `AddressCollection` consistent with the remote
//! address service and is the single source of truth for front-ends.
//!
//! # Guarantees
//!
//! - Local state is only changed after the remote call resolves. The one
//!   exception is the `Pending` marker set when a remove is requested.
//! - Remote calls that change state (`load`, `create`, `remove`) are
//!   serialized through a write queue, so concurrent operations cannot lose
//!   each other's updates.
//! - A failed call leaves the collection as it was, records the failure in
//!   the per-operation error slot, emits a `*Failed` event and returns `Err`.
//! - After `close()` (or dropping a `ScopeGuard`) in-flight calls are
//!   abandoned and never applied; new calls fail with `Cancelled`.
//!
//! # Example
//!
//! ```no_run
//! use libaddrbook::{AddressStore, AddressDraft};
//! use libaddrbook::config::ApiConfig;
//!
//! # async fn example() -> libaddrbook::Result<()> {
//! let store = AddressStore::from_config(&ApiConfig::default())?;
//! let _scope = store.scope();
//!
//! store.load().await?;
//!
//! let draft = AddressDraft {
//!     name: "Bo".to_string(),
//!     street: "1 Rd".to_string(),
//!     city: "X".to_string(),
//!     state: "Y".to_string(),
//!     zip: "0".to_string(),
//! };
//! let created = store.create(&draft).await?;
//! store.remove(created.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod lifetime;

use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use self::events::{Event, EventBus, EventReceiver};
use self::lifetime::{Lifetime, ScopeGuard};
use crate::api::{AddressApi, HttpAddressApi};
use crate::config::ApiConfig;
use crate::error::{AddrbookError, Result};
use crate::store::{AddressCollection, Operation, PendingMark};
use crate::types::{Address, AddressDraft, AddressId};

/// How a remove request was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The service confirmed the delete and the row is gone
    Removed,
    /// A delete for this id was already queued or in flight; no request sent
    AlreadyPending,
}

struct StoreInner {
    api: Arc<dyn AddressApi>,
    state: RwLock<AddressCollection>,
    writes: Mutex<()>,
    events: EventBus,
    lifetime: Lifetime,
}

/// Address store facade
///
/// Cheap to clone; clones share the same collection, queue and lifetime.
#[derive(Clone)]
pub struct AddressStore {
    inner: Arc<StoreInner>,
}

impl AddressStore {
    /// Create a store over any `AddressApi`
    pub fn new(api: Arc<dyn AddressApi>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                api,
                state: RwLock::new(AddressCollection::new()),
                writes: Mutex::new(()),
                events: EventBus::new(100),
                lifetime: Lifetime::new(),
            }),
        }
    }

    /// Create a store talking HTTP to the configured origin
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let api = HttpAddressApi::new(config)?;
        Ok(Self::new(Arc::new(api)))
    }

    fn read(&self) -> RwLockReadGuard<'_, AddressCollection> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AddressCollection> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.inner.lifetime.is_cancelled() {
            Err(AddrbookError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run a remote call, abandoning it if the store is closed meanwhile
    async fn call<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            result = request => {
                if self.inner.lifetime.is_cancelled() {
                    Err(AddrbookError::Cancelled)
                } else {
                    result
                }
            }
            _ = self.inner.lifetime.cancelled() => Err(AddrbookError::Cancelled),
        }
    }

    /// Fetch the full collection and replace the local one
    ///
    /// # Returns
    ///
    /// Number of addresses loaded
    ///
    /// # Errors
    ///
    /// On any remote failure the local collection is left unchanged and the
    /// error is recorded under `Operation::Load` before being returned.
    pub async fn load(&self) -> Result<usize> {
        self.ensure_open()?;
        let _queue = self.inner.writes.lock().await;
        self.ensure_open()?;

        let previous = self.write().begin_load();
        self.inner.events.emit(Event::LoadStarted);

        match self.call(self.inner.api.list()).await {
            Ok(addresses) => {
                let count = addresses.len();
                self.write().apply_loaded(addresses);
                info!("Loaded {} addresses from {}", count, self.inner.api.describe());
                self.inner.events.emit(Event::Loaded { count });
                Ok(count)
            }
            Err(AddrbookError::Cancelled) => {
                debug!("Load abandoned: store closed");
                self.write().abandon_load(previous);
                Err(AddrbookError::Cancelled)
            }
            Err(e) => {
                error!("Error fetching addresses: {}", e);
                self.write().record_failure(Operation::Load, e.to_string(), None);
                self.inner.events.emit(Event::LoadFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Create an address and append the server's record to the collection
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` without contacting the service if any field of
    /// the draft is empty. Remote failures leave the collection unchanged and
    /// are recorded under `Operation::Create`.
    pub async fn create(&self, draft: &AddressDraft) -> Result<Address> {
        self.ensure_open()?;

        draft.validate()?;

        let op_id = uuid::Uuid::new_v4().to_string();
        let _queue = self.inner.writes.lock().await;
        self.ensure_open()?;

        self.inner.events.emit(Event::CreateStarted {
            op_id: op_id.clone(),
        });

        match self.call(self.inner.api.create(draft)).await {
            Ok(address) => {
                self.write().apply_created(address.clone());
                info!("Created address {} ({})", address.id, address.name);
                self.inner.events.emit(Event::Created {
                    op_id,
                    address: address.clone(),
                });
                Ok(address)
            }
            Err(AddrbookError::Cancelled) => {
                debug!("Create abandoned: store closed");
                Err(AddrbookError::Cancelled)
            }
            Err(e) => {
                error!("Error adding address: {}", e);
                self.write()
                    .record_failure(Operation::Create, e.to_string(), None);
                self.inner.events.emit(Event::CreateFailed {
                    op_id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Delete an address and drop it from the collection
    ///
    /// The row is marked `Pending` immediately. A second call for an id that
    /// is already pending sends no request. Ids unknown locally are still
    /// sent to the service, which is authoritative.
    ///
    /// # Errors
    ///
    /// Remote failures (including not-found) put the row back to `Present`
    /// and are recorded under `Operation::Remove`.
    pub async fn remove(&self, id: AddressId) -> Result<RemoveOutcome> {
        self.ensure_open()?;

        if self.write().mark_pending(id) == PendingMark::AlreadyPending {
            debug!("Delete of address {} already pending, skipping", id);
            return Ok(RemoveOutcome::AlreadyPending);
        }

        let _queue = self.inner.writes.lock().await;
        if self.is_closed() {
            self.write().revert_pending(id);
            return Err(AddrbookError::Cancelled);
        }

        self.inner.events.emit(Event::RemoveStarted { id });

        match self.call(self.inner.api.delete(id)).await {
            Ok(()) => {
                self.write().apply_removed(id);
                info!("Removed address {}", id);
                self.inner.events.emit(Event::Removed { id });
                Ok(RemoveOutcome::Removed)
            }
            Err(AddrbookError::Cancelled) => {
                debug!("Delete of address {} abandoned: store closed", id);
                self.write().revert_pending(id);
                Err(AddrbookError::Cancelled)
            }
            Err(e) => {
                error!("Error deleting address {}: {}", id, e);
                {
                    let mut state = self.write();
                    state.revert_pending(id);
                    state.record_failure(Operation::Remove, e.to_string(), Some(id));
                }
                self.inner.events.emit(Event::RemoveFailed {
                    id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Copy of the current collection, for rendering
    pub fn snapshot(&self) -> AddressCollection {
        self.read().clone()
    }

    /// Addresses in collection order
    pub fn addresses(&self) -> Vec<Address> {
        self.read().addresses()
    }

    /// Dismiss the recorded failure of `operation`
    pub fn clear_error(&self, operation: Operation) {
        self.write().clear_error(operation);
    }

    /// Subscribe to store events
    pub fn subscribe(&self) -> EventReceiver {
        self.inner.events.subscribe()
    }

    /// Cancel in-flight calls and refuse new ones
    pub fn close(&self) {
        if !self.inner.lifetime.is_cancelled() {
            debug!("Closing address store");
        }
        self.inner.lifetime.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lifetime.is_cancelled()
    }

    /// Guard that closes the store when dropped
    pub fn scope(&self) -> ScopeGuard {
        ScopeGuard::new(self.inner.lifetime.clone())
    }

    /// Endpoint description for logs and status lines
    pub fn endpoint(&self) -> String {
        self.inner.api.describe()
    }
}
