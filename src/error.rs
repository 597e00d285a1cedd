//! Error types for the playback session

use thiserror::Error;

/// Errors reported by the session core.
///
/// None of these are fatal: the UI shows them and the session stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A path or entry could not be turned into a URI
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// Nothing to play in the current mode
    #[error("No media to play, open a file or playlist first")]
    NoCurrentMedia,

    /// `next` was requested on a playlist with no entries
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// `next` was requested while a single file is open
    #[error("Next is only available for playlists")]
    NotPlaylistMode,

    /// The playlist parser reported failure
    #[error("Playlist parsing failed{}", partial_suffix(.partial))]
    PlaylistParseFailed { partial: bool },

    /// The media pipeline rejected a command or reported an error
    #[error("Playback error: {0}")]
    PipelineError(String),

    /// The media pipeline could not be acquired at startup
    #[error("Media pipeline unavailable: {0}")]
    PipelineUnavailable(String),
}

fn partial_suffix(partial: &bool) -> &'static str {
    if *partial { " (partial results kept)" } else { "" }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, CoreError>;
