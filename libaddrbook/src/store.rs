//! Local address collection state
//!
//! `AddressCollection` is the plain data behind `AddressStore`: the ordered
//! entries, whether a load has completed, and the last failure of each
//! operation. Every method is synchronous and performs no I/O; the async
//! store applies remote outcomes through them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use crate::types::{Address, AddressId};

/// Store operations that talk to the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Load,
    Create,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Load => write!(f, "load"),
            Operation::Create => write!(f, "create"),
            Operation::Remove => write!(f, "remove"),
        }
    }
}

/// Lifecycle of a row in the collection
///
/// `Present -> Pending -> (removed | Present)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Present,
    /// A delete request is queued or in flight
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    pub address: Address,
    pub status: RowStatus,
}

impl AddressEntry {
    fn present(address: Address) -> Self {
        Self {
            address,
            status: RowStatus::Present,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

/// A failed remote call, kept so a UI can show it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFailure {
    pub operation: Operation,
    pub message: String,
    pub address_id: Option<AddressId>,
    pub at: DateTime<Utc>,
}

/// Last failure per operation, cleared by that operation's next success
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationErrors {
    pub load: Option<OperationFailure>,
    pub create: Option<OperationFailure>,
    pub remove: Option<OperationFailure>,
}

impl OperationErrors {
    fn slot_mut(&mut self, operation: Operation) -> &mut Option<OperationFailure> {
        match operation {
            Operation::Load => &mut self.load,
            Operation::Create => &mut self.create,
            Operation::Remove => &mut self.remove,
        }
    }

    pub fn get(&self, operation: Operation) -> Option<&OperationFailure> {
        match operation {
            Operation::Load => self.load.as_ref(),
            Operation::Create => self.create.as_ref(),
            Operation::Remove => self.remove.as_ref(),
        }
    }

    /// Most recent failure across all operations
    pub fn latest(&self) -> Option<&OperationFailure> {
        [&self.load, &self.create, &self.remove]
            .into_iter()
            .flatten()
            .max_by_key(|f| f.at)
    }

    pub fn is_empty(&self) -> bool {
        self.load.is_none() && self.create.is_none() && self.remove.is_none()
    }
}

/// Result of trying to mark a row as pending removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingMark {
    Marked,
    AlreadyPending,
    NotPresent,
}

/// Ordered address collection with per-row status and per-operation errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCollection {
    entries: Vec<AddressEntry>,
    load_state: LoadState,
    errors: OperationErrors,
}

impl AddressCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection holding `addresses` as if just loaded
    pub fn from_addresses(addresses: Vec<Address>) -> Self {
        let mut collection = Self::new();
        collection.apply_loaded(addresses);
        collection
    }

    pub fn entries(&self) -> &[AddressEntry] {
        &self.entries
    }

    /// Plain addresses in collection order
    pub fn addresses(&self) -> Vec<Address> {
        self.entries.iter().map(|e| e.address.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The UI should show its "no addresses" placeholder instead of rows
    pub fn shows_placeholder(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: AddressId) -> Option<&AddressEntry> {
        self.entries.iter().find(|e| e.address.id == id)
    }

    pub fn contains(&self, id: AddressId) -> bool {
        self.get(id).is_some()
    }

    pub fn status(&self, id: AddressId) -> Option<RowStatus> {
        self.get(id).map(|e| e.status)
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn errors(&self) -> &OperationErrors {
        &self.errors
    }

    pub fn error(&self, operation: Operation) -> Option<&OperationFailure> {
        self.errors.get(operation)
    }

    /// Ids currently waiting on a delete
    pub fn pending_ids(&self) -> Vec<AddressId> {
        self.entries
            .iter()
            .filter(|e| e.status == RowStatus::Pending)
            .map(|e| e.address.id)
            .collect()
    }

    /// Mark a load in flight, returning the state it replaces
    pub fn begin_load(&mut self) -> LoadState {
        std::mem::replace(&mut self.load_state, LoadState::Loading)
    }

    /// Undo `begin_load` for a load whose result will never be applied
    pub fn abandon_load(&mut self, previous: LoadState) {
        if self.load_state == LoadState::Loading {
            self.load_state = previous;
        }
    }

    /// Replace the collection with the server's, in server order
    ///
    /// Rows that were pending removal and are still on the server keep their
    /// `Pending` status, since their delete is still queued.
    pub fn apply_loaded(&mut self, addresses: Vec<Address>) {
        let pending: HashSet<AddressId> = self.pending_ids().into_iter().collect();

        self.entries = addresses
            .into_iter()
            .map(|address| {
                let status = if pending.contains(&address.id) {
                    RowStatus::Pending
                } else {
                    RowStatus::Present
                };
                AddressEntry { address, status }
            })
            .collect();
        self.load_state = LoadState::Loaded;
        self.errors.load = None;
    }

    /// Append a record returned by a successful create
    pub fn apply_created(&mut self, address: Address) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.address.id == address.id)
        {
            warn!(
                "Server returned id {} which is already in the collection, replacing it",
                address.id
            );
            *existing = AddressEntry::present(address);
        } else {
            self.entries.push(AddressEntry::present(address));
        }
        self.errors.create = None;
    }

    /// Mark a row as waiting on a delete
    pub fn mark_pending(&mut self, id: AddressId) -> PendingMark {
        match self.entries.iter_mut().find(|e| e.address.id == id) {
            None => PendingMark::NotPresent,
            Some(entry) if entry.status == RowStatus::Pending => PendingMark::AlreadyPending,
            Some(entry) => {
                entry.status = RowStatus::Pending;
                PendingMark::Marked
            }
        }
    }

    /// Return a pending row to `Present` after a failed or abandoned delete
    pub fn revert_pending(&mut self, id: AddressId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.address.id == id) {
            entry.status = RowStatus::Present;
        }
    }

    /// Drop exactly the rows with `id`, keeping the order of the rest
    pub fn apply_removed(&mut self, id: AddressId) {
        self.entries.retain(|e| e.address.id != id);
        self.errors.remove = None;
    }

    /// Remember a failure for the UI
    pub fn record_failure(
        &mut self,
        operation: Operation,
        message: impl Into<String>,
        address_id: Option<AddressId>,
    ) {
        if operation == Operation::Load {
            self.load_state = LoadState::Failed;
        }
        *self.errors.slot_mut(operation) = Some(OperationFailure {
            operation,
            message: message.into(),
            address_id,
            at: Utc::now(),
        });
    }

    pub fn clear_error(&mut self, operation: Operation) {
        *self.errors.slot_mut(operation) = None;
    }
}
