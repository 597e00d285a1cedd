//! Playback control methods

use crate::model::{classify_for_display, AppMode, PlaybackState};
use crate::parser::PlaylistParser;
use crate::pipeline::MediaPipeline;

use super::AppController;

impl<P: MediaPipeline, R: PlaylistParser> AppController<P, R> {
    pub fn open_path(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }

        match self.session.open(path) {
            Ok(AppMode::Playlist) => {
                tracing::info!(path, "Playlist opened");
                self.ui.set_status(format!("Loading playlist {}", path));
            }
            Ok(AppMode::SingleFile) => {
                tracing::info!(path, "File opened");
                self.ui.set_status(format!("Opened {}", path));
            }
            Err(e) => {
                tracing::error!(path, error = %e, "Open failed");
                self.ui.set_error(Self::format_error(&e));
            }
        }
    }

    pub fn play(&mut self) {
        if let Err(e) = self.session.play() {
            tracing::error!(error = %e, "Play failed");
            self.ui.set_error(Self::format_error(&e));
        }
    }

    pub fn next(&mut self) {
        tracing::debug!("Skipping to next entry");
        if let Err(e) = self.session.next() {
            tracing::error!(error = %e, "Next failed");
            self.ui.set_error(Self::format_error(&e));
        }
    }

    pub fn stop(&mut self) {
        if let Err(e) = self.session.stop() {
            tracing::error!(error = %e, "Stop failed");
            self.ui.set_error(Self::format_error(&e));
        }
    }

    /// Report whether the typed or active path would open as a playlist
    pub fn test_path(&mut self) {
        let candidate = if self.ui.open_input.trim().is_empty() {
            self.session.active_path().map(str::to_string)
        } else {
            Some(self.ui.open_input.trim().to_string())
        };

        let Some(path) = candidate else {
            self.ui.set_status("Nothing to test. Press 'o' to enter a path.");
            return;
        };

        let verdict = if classify_for_display(&path) { "playlist" } else { "single file" };
        tracing::debug!(path = %path, verdict, "Path tested");
        self.ui.set_status(format!("{} opens as a {}", path, verdict));
    }

    /// Play as soon as there is something to play
    pub fn request_autoplay(&mut self) {
        self.autoplay_pending = true;
        self.try_autoplay();
    }

    pub(super) fn try_autoplay(&mut self) {
        if !self.autoplay_pending || self.session.state() != &PlaybackState::Idle {
            return;
        }

        let ready = match self.session.mode() {
            AppMode::Playlist => !self.session.store().is_empty(),
            AppMode::SingleFile => self.session.active_path().is_some(),
        };
        // A finished ingestion with no entries will never become ready
        let exhausted = self.session.mode() == AppMode::Playlist && !self.session.is_ingesting();

        if ready {
            self.autoplay_pending = false;
            self.play();
        } else if exhausted {
            self.autoplay_pending = false;
        }
    }
}
