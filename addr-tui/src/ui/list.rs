//! Address list pane

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{AppState, Focus};
use libaddrbook::list::{AddressRow, ListView, EMPTY_PLACEHOLDER};
use libaddrbook::RowStatus;

pub fn render_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::List;
    let title = if state.is_loading() {
        format!(" Addresses ({}, refreshing...) ", state.collection.len())
    } else {
        format!(" Addresses ({}) ", state.collection.len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused && state.config.colors_enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });

    match state.list_view() {
        ListView::Loading => {
            let text = Paragraph::new("Loading addresses...")
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(text, area);
        }
        ListView::Empty => {
            let text = Paragraph::new(Span::styled(
                EMPTY_PLACEHOLDER,
                Style::default().fg(Color::DarkGray),
            ))
            .block(block)
            .alignment(Alignment::Center);
            frame.render_widget(text, area);
        }
        ListView::Rows(rows) => {
            let items: Vec<ListItem> = rows.iter().map(|row| row_item(row, state)).collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");

            let mut list_state = ListState::default();
            if focused {
                list_state.select(Some(state.selected));
            }
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

/// Three lines per address plus a spacer
fn row_item(row: &AddressRow, state: &AppState) -> ListItem<'static> {
    let pending = row.status == RowStatus::Pending;
    let name_style = if pending {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut name = vec![Span::styled(row.name.clone(), name_style)];
    if pending {
        name.push(Span::styled(
            "  (removing...)",
            if state.config.colors_enabled {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            },
        ));
    }

    ListItem::new(vec![
        Line::from(name),
        Line::from(format!("  {}", row.street)),
        Line::from(format!("  {}", row.locality)),
        Line::from(""),
    ])
}
