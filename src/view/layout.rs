//! Layout rendering (top bar, playlist area)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::controller::SessionSnapshot;
use crate::model::{classify_for_display, AppMode};

use super::utils::{calculate_num_width, render_scrollable_list, truncate_string};

pub fn render_top_bar(frame: &mut Frame, area: Rect, session: &SessionSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Active path
            Constraint::Length(14), // Playlist indicator
        ])
        .split(area);

    let (path_text, path_style) = match &session.active_path {
        Some(path) => (path.as_str(), Style::default().fg(Color::White)),
        None => ("Press 'o' to open a file or playlist", Style::default().fg(Color::DarkGray)),
    };

    let path = Paragraph::new(path_text).style(path_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Open ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(path, chunks[0]);

    let is_playlist = session
        .active_path
        .as_deref()
        .is_some_and(classify_for_display);
    let (indicator, indicator_style) = if is_playlist {
        ("✓ playlist", Style::default().fg(Color::Green))
    } else {
        ("✗ playlist", Style::default().fg(Color::DarkGray))
    };

    let mode = Paragraph::new(indicator)
        .style(indicator_style)
        .block(Block::default().borders(Borders::ALL).title(" Mode "));
    frame.render_widget(mode, chunks[1]);
}

pub fn render_playlist(frame: &mut Frame, area: Rect, session: &SessionSnapshot) {
    let title = match (session.mode, session.ingesting) {
        (AppMode::Playlist, true) => format!(" Playlist ({}, loading...) ", session.entries.len()),
        (AppMode::Playlist, false) => format!(" Playlist ({}) ", session.entries.len()),
        (AppMode::SingleFile, _) => " Playlist ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1));

    if session.mode != AppMode::Playlist {
        let hint = Paragraph::new("Single file mode").style(Style::default().fg(Color::DarkGray)).block(block);
        frame.render_widget(hint, area);
        return;
    }

    let num_width = calculate_num_width(session.entries.len());
    let name_width = (area.width as usize).saturating_sub(num_width + 6);

    let items: Vec<ListItem> = session
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let is_current = i == session.current_index;
            let marker = if is_current && session.state.is_playing() { "▶" } else { " " };

            let style = if is_current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let text = format!(
                "{:>num_width$} {} {}",
                i + 1,
                marker,
                truncate_string(entry.display_name(), name_width),
                num_width = num_width
            );
            ListItem::new(text).style(style)
        })
        .collect();

    render_scrollable_list(frame, area, items, session.current_index, block);
}
