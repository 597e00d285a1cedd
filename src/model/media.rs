//! Media references and the bounded strings they are built from

use std::fmt;
use std::ops::Deref;
use std::path::Path;

use url::Url;

use crate::error::{CoreError, Result};

/// Size of the title field, terminator included
pub const MAX_TITLE_LENGTH: usize = 64;
/// Size of the uri/path field, terminator included
pub const MAX_PATH: usize = 256;

/// Owned string that never holds more than `N - 1` bytes.
///
/// Longer input is cut at the last char boundary that fits, so the stored
/// value is always valid UTF-8.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundedString<const N: usize>(String);

impl<const N: usize> BoundedString<N> {
    /// Largest number of bytes a value can hold
    pub const CAPACITY: usize = N - 1;

    pub fn new(value: &str) -> Self {
        Self(truncate_to_boundary(value, Self::CAPACITY).to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> Deref for BoundedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type Title = BoundedString<MAX_TITLE_LENGTH>;
pub type PathString = BoundedString<MAX_PATH>;

/// Longest prefix of `s` that fits in `max_bytes` without splitting a character
pub fn truncate_to_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Turn a user path or playlist entry into a URI.
///
/// Anything that already parses with a real scheme is kept as-is; single
/// letter schemes are Windows drive letters and are treated as paths. Other
/// input becomes a `file://` URI, resolved against the current directory
/// when relative.
pub fn normalize_uri(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidUri("empty path".to_string()));
    }

    if let Ok(url) = Url::parse(trimmed) {
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }

    let path = Path::new(trimmed);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| CoreError::InvalidUri(format!("{}: {}", trimmed, e)))?
            .join(path)
    };

    Url::from_file_path(&absolute).map_err(|_| CoreError::InvalidUri(trimmed.to_string()))
}

/// One playable item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaReference {
    title: Title,
    uri: PathString,
}

impl MediaReference {
    /// Build a reference, truncating both fields to their bounds.
    ///
    /// Fails only when the truncated uri is not a valid URI.
    pub fn new(title: Option<&str>, uri: &str) -> Result<Self> {
        let uri = PathString::new(uri);
        Url::parse(uri.as_str()).map_err(|e| CoreError::InvalidUri(format!("{}: {}", uri, e)))?;

        Ok(Self {
            title: Title::new(title.unwrap_or_default()),
            uri,
        })
    }

    /// Title, empty when the playlist had none
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    pub fn uri(&self) -> &str {
        self.uri.as_str()
    }

    /// Title if present, otherwise the uri
    pub fn display_name(&self) -> &str {
        if self.has_title() { self.title() } else { self.uri() }
    }
}
