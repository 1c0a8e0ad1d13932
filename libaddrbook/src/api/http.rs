//! HTTP implementation of the address service client

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::AddressApi;
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::types::{Address, AddressDraft, AddressId};

/// Longest server error body kept in an error message
const MAX_ERROR_BODY: usize = 200;

/// Address service client over HTTP + JSON
#[derive(Clone)]
pub struct HttpAddressApi {
    client: Client,
    origin: String,
}

impl HttpAddressApi {
    /// Create a client for the configured origin
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            origin: config.origin().to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/addresses", self.origin)
    }

    fn item_url(&self, id: AddressId) -> String {
        format!("{}/addresses/{}", self.origin, id)
    }
}

/// Map a reqwest failure that happened before a response was available
fn map_transport_error(error: reqwest::Error, context: &str) -> ApiError {
    if error.is_timeout() {
        ApiError::Network(format!("{} timed out: {}", context, error))
    } else if error.is_connect() {
        ApiError::Network(format!("{} could not connect: {}", context, error))
    } else {
        ApiError::Network(format!("{} failed: {}", context, error))
    }
}

/// Turn a non-success response into `ApiError::Status`
async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();

    let message = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    } else {
        body.chars().take(MAX_ERROR_BODY).collect()
    };

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    if !response.status().is_success() {
        return Err(status_error(response).await.into());
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_transport_error(e, context))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Malformed(format!("{}: {}", context, e)).into())
}

#[async_trait]
impl AddressApi for HttpAddressApi {
    async fn list(&self) -> Result<Vec<Address>> {
        let url = self.collection_url();
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "List addresses"))?;

        decode(response, "List addresses").await
    }

    async fn create(&self, draft: &AddressDraft) -> Result<Address> {
        let url = self.collection_url();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Create address"))?;

        decode(response, "Create address").await
    }

    async fn delete(&self, id: AddressId) -> Result<()> {
        let url = self.item_url(id);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Delete address"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id).into());
        }
        if !response.status().is_success() {
            return Err(status_error(response).await.into());
        }

        // Body is unspecified
        Ok(())
    }

    fn describe(&self) -> String {
        self.origin.clone()
    }
}
