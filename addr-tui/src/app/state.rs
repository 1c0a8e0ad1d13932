//! Application state
//!
//! Plain state structure; all transitions go through the reducer
//! (see `reducer.rs`).

use libaddrbook::list::{self, ListView};
use libaddrbook::store::LoadState;
use libaddrbook::{AddressCollection, AddressField, AddressForm, AddressId};

/// Root application state
///
/// Single source of truth for the UI. The address collection here is a copy
/// of the store's, refreshed after every store event.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Should the application quit?
    pub should_quit: bool,

    /// Help overlay visible?
    pub help_visible: bool,

    /// Which widget receives typed input
    pub focus: Focus,

    /// New-address form
    pub form: AddressForm,

    /// Last synced copy of the store's collection
    pub collection: AddressCollection,

    /// Index of the selected row in the list
    pub selected: usize,

    /// Status bar state
    pub status: StatusBarState,

    /// Error overlay state
    pub error: Option<String>,

    /// UI configuration
    pub config: UiConfig,
}

/// Focus target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(AddressField),
    List,
}

impl Focus {
    /// Next target in Tab order: the five fields, then the list
    pub fn next(self) -> Focus {
        match self {
            Focus::Field(field) => field.next().map(Focus::Field).unwrap_or(Focus::List),
            Focus::List => Focus::Field(AddressField::ALL[0]),
        }
    }

    /// Previous target in Tab order
    pub fn prev(self) -> Focus {
        match self {
            Focus::Field(field) => field.prev().map(Focus::Field).unwrap_or(Focus::List),
            Focus::List => Focus::Field(AddressField::ALL[AddressField::ALL.len() - 1]),
        }
    }
}

/// Status bar state
#[derive(Debug, Clone, Default)]
pub struct StatusBarState {
    /// Current status message
    pub message: Option<String>,
}

/// UI configuration
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Use colors?
    pub colors_enabled: bool,

    /// Tick rate in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            should_quit: false,
            help_visible: false,
            focus: Focus::Field(AddressField::Name),
            form: AddressForm::new(),
            collection: AddressCollection::new(),
            selected: 0,
            status: StatusBarState::default(),
            error: None,
            config: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        let colors_enabled =
            std::env::var("NO_COLOR").is_err() && std::env::var("ADDR_TUI_NO_COLOR").is_err();

        let tick_rate_ms = std::env::var("ADDR_TUI_TICK_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(100);

        Self {
            colors_enabled,
            tick_rate_ms,
        }
    }
}

impl AppState {
    /// Create new application state with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Form submission is allowed (all fields set, nothing in flight)
    pub fn can_submit(&self) -> bool {
        self.form.can_submit()
    }

    /// What the list pane shows
    pub fn list_view(&self) -> ListView {
        list::view(&self.collection)
    }

    /// Id of the selected row if it may be removed
    pub fn selected_remove_target(&self) -> Option<AddressId> {
        list::remove_target(&self.collection, self.selected)
    }

    /// A load is in flight, first fetch or reload
    pub fn is_loading(&self) -> bool {
        self.collection.load_state() == LoadState::Loading
    }

    /// Overlays swallow most keys
    pub fn overlay_visible(&self) -> bool {
        self.help_visible || self.error.is_some()
    }
}
