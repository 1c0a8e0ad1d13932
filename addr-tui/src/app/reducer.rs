//! Pure reducer function for state transitions
//!
//! `(State, Action) -> State`. The reducer never talks to the store; the
//! main loop starts store operations and feeds their outcomes back in as
//! actions.

use super::actions::Action;
use super::state::{AppState, Focus, StatusBarState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use libaddrbook::AddressField;

/// Pure reducer function
///
/// Takes current state and an action, returns new state. No I/O.
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        // === UI Events ===
        Action::Key(key) => match key_action(&state, key) {
            Some(action) => reduce(state, action),
            None => state,
        },
        Action::Tick => state,
        Action::Resize(_, _) => state,

        // === Navigation ===
        Action::Quit => AppState {
            should_quit: true,
            ..state
        },

        Action::ShowHelp => AppState {
            help_visible: true,
            ..state
        },

        Action::HideHelp => AppState {
            help_visible: false,
            ..state
        },

        Action::FocusNext => AppState {
            focus: state.focus.next(),
            ..state
        },

        Action::FocusPrev => AppState {
            focus: state.focus.prev(),
            ..state
        },

        // === Form ===
        Action::FieldChanged { field, value } => {
            let mut form = state.form;
            form.on_field_change(field, value);
            AppState { form, ..state }
        }

        Action::SubmitRequested => {
            // Starting the create is up to the main loop
            let invalid = state.form.draft().validate().err();
            if state.form.is_submitting() {
                set_status(state, "Already saving, please wait")
            } else if let Some(e) = invalid {
                set_status(state, e.to_string())
            } else {
                state
            }
        }

        Action::SubmitStarted => {
            let mut form = state.form;
            let status = match form.begin_submit() {
                Ok(_) => "Saving address...".to_string(),
                Err(e) => e.to_string(),
            };
            AppState {
                form,
                status: StatusBarState {
                    message: Some(status),
                },
                ..state
            }
        }

        Action::SubmitSucceeded(address) => {
            let mut form = state.form;
            form.complete_success();
            AppState {
                form,
                focus: Focus::Field(AddressField::Name),
                status: StatusBarState {
                    message: Some(format!("Added {} (#{})", address.name, address.id)),
                },
                ..state
            }
        }

        Action::SubmitFailed(error) => {
            let mut form = state.form;
            form.complete_failure(error.clone());
            AppState {
                form,
                status: StatusBarState {
                    message: Some("Address not saved; the form was kept".to_string()),
                },
                error: Some(format!("Error adding address: {}", error)),
                ..state
            }
        }

        // === List ===
        Action::SelectNext => {
            let last = state.collection.len().saturating_sub(1);
            AppState {
                selected: (state.selected + 1).min(last),
                ..state
            }
        }

        Action::SelectPrev => AppState {
            selected: state.selected.saturating_sub(1),
            ..state
        },

        Action::RemoveRequested(id) => set_status(state, format!("Removing address #{}...", id)),

        Action::ReloadRequested => set_status(state, "Reloading addresses..."),

        Action::CollectionSynced(collection) => {
            let last = collection.len().saturating_sub(1);
            AppState {
                selected: state.selected.min(last),
                collection,
                ..state
            }
        }

        // === Error Handling ===
        Action::ShowError(error) => AppState {
            error: Some(error),
            ..state
        },

        Action::DismissError => AppState {
            error: None,
            ..state
        },

        // === Status Bar ===
        Action::SetStatus(message) => set_status(state, message),

        Action::ClearStatus => AppState {
            status: StatusBarState { message: None },
            ..state
        },
    }
}

fn set_status(state: AppState, message: impl Into<String>) -> AppState {
    AppState {
        status: StatusBarState {
            message: Some(message.into()),
        },
        ..state
    }
}

/// Map a key press to an action
///
/// This is where keybindings are defined. Global keys come first, then keys
/// for the focused widget.
pub fn key_action(state: &AppState, key: KeyEvent) -> Option<Action> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Some(Action::Quit),

        (KeyCode::F(1), _) => {
            return Some(if state.help_visible {
                Action::HideHelp
            } else {
                Action::ShowHelp
            });
        }

        (KeyCode::Esc, _) if state.error.is_some() => return Some(Action::DismissError),
        (KeyCode::Esc, _) if state.help_visible => return Some(Action::HideHelp),

        _ => {}
    }

    // Overlays are modal
    if state.overlay_visible() {
        return None;
    }

    match (key.code, key.modifiers) {
        (KeyCode::F(5), _) | (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
            return Some(Action::ReloadRequested);
        }
        (KeyCode::Tab, _) => return Some(Action::FocusNext),
        (KeyCode::BackTab, _) => return Some(Action::FocusPrev),
        _ => {}
    }

    match state.focus {
        Focus::Field(field) => field_key_action(state, field, key),
        Focus::List => list_key_action(state, key),
    }
}

/// Keys while a form field has focus
fn field_key_action(state: &AppState, field: AddressField, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => Some(Action::SubmitRequested),
        // The draft is frozen while it is being saved
        _ if state.form.is_submitting() => None,
        KeyCode::Backspace => {
            let mut value = state.form.value(field).to_string();
            value.pop()?;
            Some(Action::FieldChanged { field, value })
        }
        KeyCode::Char(c)
            if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT =>
        {
            let mut value = state.form.value(field).to_string();
            value.push(c);
            Some(Action::FieldChanged { field, value })
        }
        _ => None,
    }
}

/// Keys while the address list has focus
fn list_key_action(state: &AppState, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrev),
        KeyCode::Char('d') | KeyCode::Delete => match state.selected_remove_target() {
            Some(id) => Some(Action::RemoveRequested(id)),
            None if state.collection.is_empty() => None,
            None => Some(Action::SetStatus(
                "Removal already in progress".to_string(),
            )),
        },
        _ => None,
    }
}
