//! New-address form pane

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{AppState, Focus};
use libaddrbook::AddressField;

/// Render the form: one bordered input per field
pub fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = if state.form.is_submitting() {
        " Add Address (saving...) "
    } else {
        " Add Address "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(state, matches!(state.focus, Focus::Field(_))));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            AddressField::ALL
                .iter()
                .map(|_| Constraint::Length(1))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    for (i, field) in AddressField::ALL.into_iter().enumerate() {
        frame.render_widget(field_line(state, field), rows[i]);
    }

    let hint = if state.can_submit() {
        Line::from(Span::styled(
            "Enter: Add Address",
            Style::default().fg(Color::Green),
        ))
    } else {
        let missing: Vec<&str> = state.form.missing_fields().iter().map(|f| f.label()).collect();
        if missing.is_empty() {
            Line::from("")
        } else {
            Line::from(Span::styled(
                format!("Required: {}", missing.join(", ")),
                Style::default().fg(Color::DarkGray),
            ))
        }
    };
    frame.render_widget(Paragraph::new(hint), rows[AddressField::ALL.len()]);
}

fn field_line(state: &AppState, field: AddressField) -> Line<'static> {
    let focused = state.focus == Focus::Field(field);
    let value = state.form.value(field);

    let marker = if focused { "> " } else { "  " };
    let label = Span::styled(
        format!("{}{:<15}", marker, format!("{}:", field.label())),
        if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        },
    );

    let content = if value.is_empty() {
        Span::styled(
            field.placeholder().to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(value.to_string())
    };

    let mut spans = vec![label, content];
    if focused {
        spans.push(Span::styled(
            "_",
            Style::default().add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    Line::from(spans)
}

fn border_style(state: &AppState, focused: bool) -> Style {
    if !state.config.colors_enabled {
        return Style::default();
    }
    if state.form.is_submitting() {
        Style::default().fg(Color::Yellow)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}
