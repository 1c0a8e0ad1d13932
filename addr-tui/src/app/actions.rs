//! Actions for the reducer pattern
//!
//! All state transitions are triggered by actions. Actions that need I/O
//! (submit, remove, reload) are also observed by the main loop, which starts
//! the store operation; the outcome comes back as another action.

use crossterm::event::KeyEvent;
use libaddrbook::{Address, AddressCollection, AddressField, AddressId};

/// Actions that trigger state transitions
#[derive(Debug, Clone)]
pub enum Action {
    // === UI Events ===
    /// Keyboard input event
    Key(KeyEvent),

    /// Periodic tick
    Tick,

    /// Terminal resize event
    Resize(u16, u16),

    // === Navigation ===
    /// Quit the application
    Quit,

    ShowHelp,
    HideHelp,

    /// Move focus forward (fields, then list, then wrap)
    FocusNext,

    /// Move focus backward
    FocusPrev,

    // === Form ===
    /// Replace the value of one form field
    FieldChanged { field: AddressField, value: String },

    /// User asked to submit the form
    SubmitRequested,

    /// Create request was handed to the store
    SubmitStarted,

    /// Store confirmed the create
    SubmitSucceeded(Address),

    /// Store reported a failed create
    SubmitFailed(String),

    // === List ===
    SelectNext,
    SelectPrev,

    /// User asked to remove an address
    RemoveRequested(AddressId),

    /// User asked for a full reload
    ReloadRequested,

    /// Fresh copy of the store's collection
    CollectionSynced(AddressCollection),

    // === Error Handling ===
    /// Show error overlay
    ShowError(String),

    /// Dismiss error overlay
    DismissError,

    // === Status Bar ===
    SetStatus(String),
    ClearStatus,
}

impl Action {
    /// Whether the main loop must start a store operation for this action
    pub fn needs_service(&self) -> bool {
        matches!(
            self,
            Action::SubmitRequested | Action::RemoveRequested(_) | Action::ReloadRequested
        )
    }
}
