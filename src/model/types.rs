//! Core type definitions for the application

use std::fmt;
use std::time::{Duration, Instant};

/// How long an error stays on screen before it clears itself
pub const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// Where the "current URI" comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    SingleFile,
    Playlist,
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppMode::SingleFile => f.write_str("File"),
            AppMode::Playlist => f.write_str("Playlist"),
        }
    }
}

/// Why playback stopped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    Error(String),
    UserStopped,
}

/// Session playback state
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Stopped(StopReason),
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => f.write_str("Idle"),
            PlaybackState::Playing => f.write_str("Playing"),
            PlaybackState::Stopped(StopReason::EndOfStream) => f.write_str("Stopped (end of stream)"),
            PlaybackState::Stopped(StopReason::UserStopped) => f.write_str("Stopped"),
            PlaybackState::Stopped(StopReason::Error(message)) => write!(f, "Stopped (error: {})", message),
        }
    }
}

/// What keystrokes are currently feeding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    OpenPrompt,
}

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub input_mode: InputMode,
    pub open_input: String,
    pub status_message: String,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    pub should_quit: bool,
}

impl UiState {
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.error_timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
        self.error_timestamp = None;
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn auto_clear_old_errors(&mut self) {
        if let Some(timestamp) = self.error_timestamp {
            if timestamp.elapsed() >= ERROR_DISPLAY_DURATION {
                self.clear_error();
            }
        }
    }

    pub fn open_prompt(&mut self) {
        self.input_mode = InputMode::OpenPrompt;
        self.open_input.clear();
    }

    pub fn close_prompt(&mut self) -> String {
        self.input_mode = InputMode::Normal;
        std::mem::take(&mut self.open_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reasons_render_for_status_bar() {
        assert_eq!(PlaybackState::Idle.to_string(), "Idle");
        assert_eq!(
            PlaybackState::Stopped(StopReason::Error("no decoder".into())).to_string(),
            "Stopped (error: no decoder)"
        );
    }

    #[test]
    fn prompt_returns_typed_text_and_resets() {
        let mut ui = UiState::default();
        ui.open_prompt();
        ui.open_input.push_str("/music/list.m3u");

        assert_eq!(ui.close_prompt(), "/music/list.m3u");
        assert_eq!(ui.input_mode, InputMode::Normal);
        assert!(ui.open_input.is_empty());
    }

    #[test]
    fn fresh_errors_are_kept() {
        let mut ui = UiState::default();
        ui.set_error("boom");
        ui.auto_clear_old_errors();
        assert!(ui.has_error());
    }
}
