//! Remote address service abstraction
//!
//! The address service is the authoritative store of address records. This
//! module defines the trait the store talks to, an HTTP implementation, and
//! an in-memory implementation for tests and demos.
//!
//! # Examples
//!
//! ```no_run
//! use libaddrbook::api::{AddressApi, HttpAddressApi};
//! use libaddrbook::config::ApiConfig;
//!
//! # async fn example() -> libaddrbook::Result<()> {
//! let api = HttpAddressApi::new(&ApiConfig::with_base_url("http://localhost:3000"))?;
//!
//! for address in api.list().await? {
//!     println!("{}: {}", address.id, address.name);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Address, AddressDraft, AddressId};

pub mod http;

// Mock API is available for all builds (not just tests) to support integration tests
pub mod mock;

pub use http::HttpAddressApi;
pub use mock::MockAddressApi;

/// CRUD interface of the remote address service
///
/// | Operation | Method | Path |
/// |---|---|---|
/// | list | GET | /addresses |
/// | create | POST | /addresses |
/// | delete | DELETE | /addresses/{id} |
#[async_trait]
pub trait AddressApi: Send + Sync {
    /// Fetch the full collection in server order
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network`, `ApiError::Status` or `ApiError::Malformed`.
    async fn list(&self) -> Result<Vec<Address>>;

    /// Create an address from a draft
    ///
    /// # Returns
    ///
    /// The stored record, carrying the server-assigned `id`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network`, `ApiError::Status` or `ApiError::Malformed`.
    async fn create(&self, draft: &AddressDraft) -> Result<Address>;

    /// Delete an address by id
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the service does not know `id`,
    /// otherwise `ApiError::Network` or `ApiError::Status`.
    async fn delete(&self, id: AddressId) -> Result<()>;

    /// Short description of the endpoint for logs
    fn describe(&self) -> String;
}
