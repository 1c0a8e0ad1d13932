//! addr-tui - Terminal UI for Addrbook
//!
//! Two-pane interface: a form for new addresses on top and the address list
//! below, both backed by the remote address service.

use addr_tui::{
    app::{event::EventHandler, key_action, reduce, Action, AppState},
    error::{Result, TuiError},
    services::{event_action, ServiceHandle},
    terminal::{install_panic_hook, restore_terminal, setup_terminal, Tui},
    ui,
};
use libaddrbook::config::resolve_data_path;
use libaddrbook::logging::LoggingConfig;
use libaddrbook::Config;

fn main() -> Result<()> {
    // Config errors are reported before the alternate screen is entered
    let config = Config::load()?;

    let mut logging = LoggingConfig::from_section(&config.logging, false);
    if let Ok(dir) = resolve_data_path() {
        logging = logging.with_file(dir.join("addr-tui.log"));
    }
    logging.init();

    install_panic_hook();

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &config);
    restore_terminal(terminal)?;

    if let Err(ref e) = result {
        tracing::error!("addr-tui exited with error: {}", e);
    }
    result
}

fn run_app(terminal: &mut Tui, config: &Config) -> Result<()> {
    let mut state = AppState::new();

    let services = ServiceHandle::new(config)?;
    let events = services.subscribe();
    tracing::info!("addr-tui started against {}", services.endpoint());

    // Initial fetch on mount
    services.load();

    let event_handler = EventHandler::new(state.config.tick_rate_ms);

    loop {
        terminal.draw(|frame| ui::render(frame, &state))?;

        let action = match event_handler.next()? {
            addr_tui::app::event::TuiEvent::Key(key) => {
                key_action(&state, key).unwrap_or(Action::Tick)
            }
            other => other.into(),
        };

        state = reduce(state, action.clone());

        if action.needs_service() {
            match action {
                Action::SubmitRequested if state.can_submit() => {
                    state = reduce(state, Action::SubmitStarted);
                    services.create(state.form.draft().clone());
                }
                Action::RemoveRequested(id) => services.remove(id),
                Action::ReloadRequested => services.load(),
                _ => {}
            }
        }

        // Apply store events, then resync the collection copy
        let mut synced = false;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    synced = true;
                    if let Some(action) = event_action(event) {
                        state = reduce(state, action);
                    }
                }
                Err(crossbeam_channel::TryRecvError::Empty) => break,
                Err(crossbeam_channel::TryRecvError::Disconnected) => {
                    return Err(TuiError::Event("Store event channel closed".to_string()));
                }
            }
        }
        if synced {
            state = reduce(state, Action::CollectionSynced(services.snapshot()));
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}
