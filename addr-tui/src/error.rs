//! Error types for addr-tui
//!
//! Wraps address book errors and terminal/IO errors for unified handling.

use thiserror::Error;

/// TUI-specific errors
#[derive(Error, Debug)]
pub enum TuiError {
    /// Address book (config, API, store) error
    #[error("Service error: {0}")]
    Service(#[from] libaddrbook::AddrbookError),

    /// Terminal/IO error
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Event handling error
    #[error("Event error: {0}")]
    Event(String),
}

/// Result type for TUI operations
pub type Result<T> = std::result::Result<T, TuiError>;
