//! Error types for Addrbook

use thiserror::Error;

use crate::types::AddressId;

pub type Result<T> = std::result::Result<T, AddrbookError>;

#[derive(Error, Debug)]
pub enum AddrbookError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AddrbookError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AddrbookError::InvalidInput(_) => 3,
            AddrbookError::Cancelled => 130,
            AddrbookError::Api(_) => 1,
            AddrbookError::Config(_) => 1,
            AddrbookError::Serialization(_) => 1,
        }
    }

    /// True when the remote service reported the address as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, AddrbookError::Api(ApiError::NotFound(_)))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Failures talking to the remote address service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The service does not know the address
    #[error("Address {0} not found")]
    NotFound(AddressId),

    /// The response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),
}
