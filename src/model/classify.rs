//! Playlist-vs-file decision based on the path suffix

use super::types::AppMode;

/// Recognized playlist extensions, whitespace separated
pub const PLAYLIST_EXTENSIONS: &str = "m3u pls xspf";

/// Text after the last '.', if any
pub fn extension(path: &str) -> Option<&str> {
    path.rsplit_once('.').map(|(_, ext)| ext)
}

/// Classify `path` without touching the filesystem.
///
/// Matching is exact and case-sensitive; a path without a '.' is a single file.
pub fn classify(path: &str) -> AppMode {
    match extension(path) {
        Some(ext) if PLAYLIST_EXTENSIONS.split_whitespace().any(|known| known == ext) => {
            AppMode::Playlist
        }
        _ => AppMode::SingleFile,
    }
}

/// Validity indicator for the UI
pub fn classify_for_display(path: &str) -> bool {
    classify(path) == AppMode::Playlist
}
