//! Address list view model
//!
//! Projects the collection into display rows. Removing a row goes through
//! `AddressStore::remove`; rows never disappear before the store says so.

use serde::Serialize;

use crate::store::{AddressCollection, AddressEntry, LoadState, RowStatus};
use crate::types::AddressId;

/// Shown instead of the list when the collection is empty
pub const EMPTY_PLACEHOLDER: &str = "No addresses found";

/// One rendered address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRow {
    pub id: AddressId,
    pub name: String,
    pub street: String,
    /// `"city, state zip"`
    pub locality: String,
    pub status: RowStatus,
}

impl AddressRow {
    /// Whether a remove trigger should be offered
    pub fn removable(&self) -> bool {
        self.status == RowStatus::Present
    }
}

/// What the list area should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    /// First load has not finished yet
    Loading,
    /// Show `EMPTY_PLACEHOLDER`
    Empty,
    Rows(Vec<AddressRow>),
}

/// One row per entry, in collection order
pub fn rows(entries: &[AddressEntry]) -> Vec<AddressRow> {
    entries
        .iter()
        .map(|entry| AddressRow {
            id: entry.address.id,
            name: entry.address.name.clone(),
            street: entry.address.street.clone(),
            locality: entry.address.locality(),
            status: entry.status,
        })
        .collect()
}

pub fn view(collection: &AddressCollection) -> ListView {
    if collection.is_empty() {
        return match collection.load_state() {
            LoadState::NotLoaded | LoadState::Loading => ListView::Loading,
            LoadState::Loaded | LoadState::Failed => ListView::Empty,
        };
    }
    ListView::Rows(rows(collection.entries()))
}

/// Id behind the row at `index`, if that row can be removed
pub fn remove_target(collection: &AddressCollection, index: usize) -> Option<AddressId> {
    collection
        .entries()
        .get(index)
        .filter(|entry| entry.status == RowStatus::Present)
        .map(|entry| entry.address.id)
}
