//! Addrbook - a small address book client for a remote REST service
//!
//! This library keeps a local, ordered cache of postal addresses in sync with
//! a remote CRUD API and provides the form and list models that front-ends
//! (terminal UI, CLI) render.

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod list;
pub mod logging;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use api::{AddressApi, HttpAddressApi};
pub use config::Config;
pub use error::{AddrbookError, ApiError, ConfigError, Result};
pub use form::AddressForm;
pub use list::{AddressRow, ListView};
pub use service::{AddressStore, RemoveOutcome};
pub use store::{AddressCollection, AddressEntry, Operation, RowStatus};
pub use types::{Address, AddressDraft, AddressField, AddressId};
