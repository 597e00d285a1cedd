//! Playlist parser - reads local playlist files into raw entries
//!
//! Entries are reported through a callback as they are found, and the
//! parse ends with a single success/failure result. Entries reported before
//! a failure stay reported.
//!
//! - `m3u`: extended and plain M3U
//! - `pls`: INI-style PLS
//! - `xspf`: XML shareable playlists

mod m3u;
mod pls;
mod xspf;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use url::Url;

use crate::model::{classify, normalize_uri, AppMode};

/// Metadata key holding an entry's title
pub const FIELD_TITLE: &str = "title";

/// Nested playlists are never followed deeper than this
const MAX_RECURSION_DEPTH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Expand entries that are themselves playlists
    pub recurse: bool,
    /// Refuse anything that is not a local file
    pub disable_unsafe: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedEntry {
    pub uri: String,
    pub metadata: HashMap<String, String>,
}

impl ParsedEntry {
    pub fn new(uri: impl Into<String>, title: Option<String>) -> Self {
        let mut metadata = HashMap::new();
        if let Some(title) = title {
            metadata.insert(FIELD_TITLE.to_string(), title);
        }
        Self {
            uri: uri.into(),
            metadata,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.get(FIELD_TITLE).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseResult {
    Success,
    Failure(String),
}

/// Extracts (uri, metadata) entries from a playlist
pub trait PlaylistParser: Send + Sync + 'static {
    /// Blocking; callers run it off the UI task
    fn parse(&self, uri: &Url, options: ParseOptions, on_entry: &mut dyn FnMut(ParsedEntry)) -> ParseResult;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    M3u,
    Pls,
    Xspf,
}

impl Format {
    fn detect(path: &Path, content: &str) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("m3u") | Some("m3u8") => Format::M3u,
            Some("pls") => Format::Pls,
            Some("xspf") => Format::Xspf,
            _ => {
                let head = content.trim_start_matches('\u{feff}').trim_start();
                if head.starts_with("[playlist]") {
                    Format::Pls
                } else if head.starts_with("<?xml") || head.starts_with("<playlist") {
                    Format::Xspf
                } else {
                    Format::M3u
                }
            }
        }
    }
}

/// Parser for playlist files on the local filesystem
#[derive(Clone, Debug, Default)]
pub struct FilePlaylistParser;

impl FilePlaylistParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_at_depth(
        &self,
        uri: &Url,
        options: ParseOptions,
        depth: usize,
        on_entry: &mut dyn FnMut(ParsedEntry),
    ) -> ParseResult {
        if uri.scheme() != "file" {
            let reason = if options.disable_unsafe {
                "remote playlists are disabled"
            } else {
                "only local playlists are supported"
            };
            return ParseResult::Failure(format!("{}: {}", reason, uri));
        }

        let path = match uri.to_file_path() {
            Ok(path) => path,
            Err(_) => return ParseResult::Failure(format!("not a local path: {}", uri)),
        };

        let content = match std::fs::read(&path) {
            Ok(bytes) => decode_playlist(bytes),
            Err(e) => return ParseResult::Failure(format!("{}: {}", path.display(), e)),
        };

        let format = Format::detect(&path, &content);
        tracing::debug!(path = %path.display(), ?format, depth, "Parsing playlist");

        let base = EntryBase::new(uri, &path);

        let mut nested_failure = None;
        let mut emit = |entry: ParsedEntry| {
            if options.recurse && depth < MAX_RECURSION_DEPTH && classify(&entry.uri) == AppMode::Playlist {
                if let Ok(nested) = normalize_uri(&entry.uri) {
                    if let ParseResult::Failure(reason) = self.parse_at_depth(&nested, options, depth + 1, &mut *on_entry) {
                        tracing::warn!(uri = %nested, reason = %reason, "Nested playlist failed");
                        nested_failure.get_or_insert(reason);
                    }
                    return;
                }
            }
            on_entry(entry);
        };

        let result = match format {
            Format::M3u => m3u::parse(&content, &base, &mut emit),
            Format::Pls => pls::parse(&content, &base, &mut emit),
            Format::Xspf => xspf::parse(&content, &base, &mut emit),
        };

        match (result, nested_failure) {
            (ParseResult::Success, Some(reason)) => ParseResult::Failure(reason),
            (result, _) => result,
        }
    }
}

impl PlaylistParser for FilePlaylistParser {
    fn parse(&self, uri: &Url, options: ParseOptions, on_entry: &mut dyn FnMut(ParsedEntry)) -> ParseResult {
        self.parse_at_depth(uri, options, 0, on_entry)
    }
}

/// UTF-8 when valid, otherwise Latin-1, which legacy m3u/pls files use
fn decode_playlist(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(valid_up_to = e.utf8_error().valid_up_to(), "Playlist is not UTF-8, reading as Latin-1");
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Resolves entry locations relative to the playlist they came from
pub(crate) struct EntryBase {
    url: Url,
    dir: PathBuf,
}

impl EntryBase {
    fn new(url: &Url, path: &Path) -> Self {
        Self {
            url: url.clone(),
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    /// URIs pass through, absolute paths stay paths, relative paths join the
    /// playlist's directory
    pub(crate) fn resolve_path(&self, location: &str) -> String {
        if let Ok(url) = Url::parse(location) {
            if url.scheme().len() > 1 {
                return location.to_string();
            }
        }
        let path = Path::new(location);
        if path.is_absolute() {
            location.to_string()
        } else {
            self.dir.join(path).display().to_string()
        }
    }

    /// Locations that are URI references resolve against the playlist URI
    pub(crate) fn resolve_reference(&self, location: &str) -> String {
        match self.url.join(location) {
            Ok(url) => url.to_string(),
            Err(_) => self.resolve_path(location),
        }
    }
}
