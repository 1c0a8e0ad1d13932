//! In-memory address service for testing
//!
//! `MockAddressApi` behaves like a conforming remote service: it assigns
//! increasing ids, appends new records at the end and reports unknown ids as
//! not found on delete. Failures and latency can be injected per operation,
//! and every call is counted so tests can verify how many requests the store
//! actually issued.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::api::AddressApi;
use crate::error::{ApiError, Result};
use crate::types::{Address, AddressDraft, AddressId};

#[derive(Debug, Default)]
struct MockState {
    addresses: Vec<Address>,
    next_id: AddressId,
    list_failure: Option<ApiError>,
    create_failure: Option<ApiError>,
    delete_failure: Option<ApiError>,
    list_calls: usize,
    create_calls: usize,
    delete_calls: Vec<AddressId>,
}

/// Mock address service
///
/// Cloning shares the underlying state, so a test can keep a handle for
/// inspection while the store owns another.
#[derive(Debug, Clone)]
pub struct MockAddressApi {
    state: Arc<Mutex<MockState>>,
    delay: Duration,
}

impl Default for MockAddressApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAddressApi {
    /// Create an empty service; the first created address gets id 1
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                next_id: 1,
                ..Default::default()
            })),
            delay: Duration::from_millis(0),
        }
    }

    /// Create a service already holding `addresses`
    ///
    /// New ids continue after the highest seeded id.
    pub fn with_addresses(addresses: Vec<Address>) -> Self {
        let api = Self::new();
        {
            let mut state = api.state.lock().unwrap();
            state.next_id = addresses.iter().map(|a| a.id).max().unwrap_or(0) + 1;
            state.addresses = addresses;
        }
        api
    }

    /// Delay every operation by `delay` (simulates network latency)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make every `list` call fail with `error` (None restores success)
    pub fn set_list_failure(&self, error: Option<ApiError>) {
        self.state.lock().unwrap().list_failure = error;
    }

    /// Make every `create` call fail with `error` (None restores success)
    pub fn set_create_failure(&self, error: Option<ApiError>) {
        self.state.lock().unwrap().create_failure = error;
    }

    /// Make every `delete` call fail with `error` (None restores success)
    pub fn set_delete_failure(&self, error: Option<ApiError>) {
        self.state.lock().unwrap().delete_failure = error;
    }

    /// Current server-side collection
    pub fn addresses(&self) -> Vec<Address> {
        self.state.lock().unwrap().addresses.clone()
    }

    /// Insert a record directly on the server side, bypassing the client
    pub fn insert(&self, draft: &AddressDraft) -> Address {
        let mut state = self.state.lock().unwrap();
        let address = build_address(state.next_id, draft);
        state.next_id += 1;
        state.addresses.push(address.clone());
        address
    }

    /// Number of `list` calls received
    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    /// Number of `create` calls received
    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    /// Ids of all `delete` calls received, in arrival order
    pub fn delete_calls(&self) -> Vec<AddressId> {
        self.state.lock().unwrap().delete_calls.clone()
    }
}

fn build_address(id: AddressId, draft: &AddressDraft) -> Address {
    Address {
        id,
        name: draft.name.clone(),
        street: draft.street.clone(),
        city: draft.city.clone(),
        state: draft.state.clone(),
        zip: draft.zip.clone(),
    }
}

#[async_trait]
impl AddressApi for MockAddressApi {
    async fn list(&self) -> Result<Vec<Address>> {
        self.state.lock().unwrap().list_calls += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let state = self.state.lock().unwrap();
        if let Some(ref error) = state.list_failure {
            return Err(error.clone().into());
        }
        Ok(state.addresses.clone())
    }

    async fn create(&self, draft: &AddressDraft) -> Result<Address> {
        self.state.lock().unwrap().create_calls += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(ref error) = state.create_failure {
            return Err(error.clone().into());
        }

        let address = build_address(state.next_id, draft);
        state.next_id += 1;
        state.addresses.push(address.clone());
        Ok(address)
    }

    async fn delete(&self, id: AddressId) -> Result<()> {
        self.state.lock().unwrap().delete_calls.push(id);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(ref error) = state.delete_failure {
            return Err(error.clone().into());
        }

        let before = state.addresses.len();
        state.addresses.retain(|a| a.id != id);
        if state.addresses.len() == before {
            return Err(ApiError::NotFound(id).into());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
