//! Ordered playlist entries with a wraparound cursor

use crate::error::{CoreError, Result};
use super::media::MediaReference;

/// Entries in parse order plus the index of the current one.
///
/// `current < len()` whenever the store is non-empty.
#[derive(Clone, Debug, Default)]
pub struct PlaylistStore {
    entries: Vec<MediaReference>,
    current: usize,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; the cursor does not move
    pub fn push(&mut self, media: MediaReference) {
        self.entries.push(media);
    }

    /// Drop every entry and put the cursor back at the start
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&MediaReference> {
        self.entries.get(self.current)
    }

    pub fn get(&self, index: usize) -> Option<&MediaReference> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[MediaReference] {
        &self.entries
    }

    /// Move to the next entry, wrapping to the first after the last
    pub fn advance(&mut self) -> Result<&MediaReference> {
        if self.entries.is_empty() {
            return Err(CoreError::EmptyPlaylist);
        }
        self.current = (self.current + 1) % self.entries.len();
        Ok(&self.entries[self.current])
    }
}
