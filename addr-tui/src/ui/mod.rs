//! UI rendering
//!
//! Pure rendering functions that transform state into terminal frames.

mod form;
mod list;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{AppState, Focus};

/// Render the application UI
///
/// Form on top, list below, status bar at the bottom; overlays on top of all.
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Form: 5 fields + hint + borders
            Constraint::Min(3),    // List
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    form::render_form(frame, chunks[0], state);
    list::render_list(frame, chunks[1], state);
    render_status_bar(frame, chunks[2], state);

    if state.help_visible {
        render_help_overlay(frame, area);
    }

    if let Some(ref error) = state.error {
        render_error_overlay(frame, area, error);
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let hints = match state.focus {
        Focus::Field(_) => "Tab: Next field | Enter: Add | F5: Reload | F1: Help | Ctrl+C: Quit",
        Focus::List => "Up/Down: Select | d: Remove | F5: Reload | F1: Help | q: Quit",
    };

    let message = state
        .status
        .message
        .clone()
        .unwrap_or_else(|| "Ready".to_string());

    let lines = vec![
        Line::from(message),
        Line::from(Span::styled(hints, Style::default().fg(Color::Gray))),
    ];

    let status = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Global:"),
        Line::from("  Tab / Shift+Tab - Next / previous field"),
        Line::from("  F5 / Ctrl+R     - Reload addresses"),
        Line::from("  F1              - Toggle help"),
        Line::from("  Esc             - Dismiss overlays"),
        Line::from("  Ctrl+C          - Quit"),
        Line::from(""),
        Line::from("Form:"),
        Line::from("  Type            - Edit focused field"),
        Line::from("  Enter           - Add address (all fields required)"),
        Line::from(""),
        Line::from("List:"),
        Line::from("  Up / Down       - Select address"),
        Line::from("  d / Delete      - Remove selected address"),
        Line::from("  q               - Quit"),
        Line::from(""),
        Line::from("Press Esc or F1 to close"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help, popup_area);
}

fn render_error_overlay(frame: &mut Frame, area: Rect, error: &str) {
    let popup_area = centered_rect(70, 30, area);

    let error_text = vec![
        Line::from(Span::styled(
            "Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(error.to_string()),
        Line::from(""),
        Line::from("Press Esc to dismiss"),
    ];

    let error_widget = Paragraph::new(error_text)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(error_widget, popup_area);
}

/// Helper to create centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
