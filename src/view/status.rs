//! Status bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::controller::SessionSnapshot;
use crate::model::{PlaybackState, StopReason, UiState};

pub fn render_status_bar(frame: &mut Frame, area: Rect, session: &SessionSnapshot, ui_state: &UiState) {
    let state_text = match &session.state {
        PlaybackState::Playing => format!(" ▶ {}", session.state),
        other => format!(" ■ {}", other),
    };

    let now_playing = session
        .current_entry()
        .map(|entry| entry.display_name().to_string())
        .or_else(|| session.active_path.clone())
        .unwrap_or_default();

    let title = if now_playing.is_empty() {
        format!("{} ", state_text)
    } else {
        format!("{} | {} ", state_text, now_playing)
    };

    let ingest_text = match session.last_report {
        Some(report) if report.failed => format!("{} entries, parse failed", report.count),
        Some(report) => format!("{} entries", report.count),
        None if session.ingesting => "loading".to_string(),
        None => "-".to_string(),
    };
    let pipeline_text = if session.pipeline_available { "" } else { " | No player" };
    let details = format!(" Mode: {} | {}{} ", session.mode, ingest_text, pipeline_text);

    let state_style = match &session.state {
        PlaybackState::Playing => Style::default().fg(Color::Green),
        PlaybackState::Stopped(StopReason::Error(_)) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };

    let mut spans = vec![Span::styled(ui_state.status_message.as_str(), Style::default().fg(Color::Gray))];
    if let Some(error) = &session.last_error {
        if !ui_state.status_message.is_empty() {
            spans.push(Span::raw(" | "));
        }
        spans.push(Span::styled(format!("Last error: {}", error), Style::default().fg(Color::Red)));
    }

    let status = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::styled(title, state_style))
                .title_bottom(Line::from(details).right_aligned()),
        );

    frame.render_widget(status, area);
}
