//! Controller module - Application logic and event handling
//!
//! This module contains the playback session and the controller that feeds
//! it user input and bus events.
//! It is organized into submodules by responsibility:
//!
//! - `session`: Playback session state machine
//! - `ingest`: Background playlist ingestion
//! - `pipeline_events`: Media pipeline notification handling
//! - `playback`: Transport actions issued from the UI
//! - `input`: Key event handling

mod session;
mod ingest;
mod pipeline_events;
mod playback;
mod input;
#[cfg(test)]
pub(crate) mod testing;

pub use session::{PlaybackSession, SessionSnapshot};

use crate::error::CoreError;
use crate::events::SessionEvent;
use crate::model::UiState;
use crate::parser::PlaylistParser;
use crate::pipeline::MediaPipeline;

pub struct AppController<P: MediaPipeline, R: PlaylistParser> {
    session: PlaybackSession<P, R>,
    ui: UiState,
    autoplay_pending: bool,
}

impl<P: MediaPipeline, R: PlaylistParser> AppController<P, R> {
    pub fn new(session: PlaybackSession<P, R>) -> Self {
        let mut ui = UiState::default();
        if !session.pipeline_available() {
            ui.set_status("Media pipeline unavailable, playback disabled");
        }
        Self {
            session,
            ui,
            autoplay_pending: false,
        }
    }

    pub fn session(&self) -> &PlaybackSession<P, R> {
        &self.session
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui
    }

    pub fn ui_state_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    pub fn should_quit(&self) -> bool {
        self.ui.should_quit
    }

    /// Apply a bus event and surface anything it reported
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        if let Some(error) = self.session.handle_event(event) {
            self.ui.set_error(Self::format_error(&error));
        }
        self.try_autoplay();
    }

    /// Release the session; runs exactly once at exit
    pub fn shutdown(self) {
        tracing::info!("Shutting down playback session");
        self.session.close();
    }

    pub(crate) fn format_error(error: &CoreError) -> String {
        match error {
            CoreError::NoCurrentMedia => "Nothing to play. Press 'o' to open a file or playlist.".to_string(),
            CoreError::PipelineUnavailable(reason) => {
                format!("Playback disabled: {}. Install the player or pass --player.", reason)
            }
            other => format!("Error: {}", other),
        }
    }
}
