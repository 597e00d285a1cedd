//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (truncation, scrollable lists)
//! - `layout`: Main layout structure (top bar, playlist)
//! - `status`: Bottom status bar
//! - `overlays`: Modal overlays (error, open prompt, help)

mod utils;
mod layout;
mod status;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::controller::SessionSnapshot;
use crate::model::{InputMode, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, session: &SessionSnapshot, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Active path + indicator
                Constraint::Min(0),    // Playlist entries
                Constraint::Length(3), // Playback status
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], session);
        layout::render_playlist(frame, chunks[1], session);
        status::render_status_bar(frame, chunks[2], session, ui_state);

        if ui_state.input_mode == InputMode::OpenPrompt {
            overlays::render_open_prompt(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }
    }
}
