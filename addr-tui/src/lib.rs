//! addr-tui library
//!
//! Exports the application state machine, rendering and service bridge so
//! they can be tested without a terminal.

pub mod app;
pub mod error;
pub mod services;
pub mod terminal;
pub mod ui;

// Re-export commonly used types
pub use app::{reduce, Action, AppState, Focus};
pub use error::{Result, TuiError};
