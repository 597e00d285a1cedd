//! Model module - Application state and data types
//!
//! This module contains the data structures the session works on.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (mode, playback state, UI state)
//! - `media`: Bounded strings, media references and URI normalization
//! - `playlist`: Playlist store with its wraparound cursor
//! - `classify`: Playlist-vs-file decision by suffix

mod types;
mod media;
mod playlist;
mod classify;

// Re-export all public types for convenient access
pub use types::{AppMode, InputMode, PlaybackState, StopReason, UiState};

pub use media::{normalize_uri, MediaReference, PathString};

pub use playlist::PlaylistStore;

pub use classify::{classify, classify_for_display};
