//! XSPF playlists

use serde::Deserialize;

use super::{EntryBase, ParseResult, ParsedEntry};

#[derive(Debug, Deserialize)]
struct XspfDocument {
    #[serde(rename = "trackList", default)]
    track_list: XspfTrackList,
}

#[derive(Debug, Default, Deserialize)]
struct XspfTrackList {
    #[serde(rename = "track", default)]
    tracks: Vec<XspfTrack>,
}

#[derive(Debug, Deserialize)]
struct XspfTrack {
    #[serde(default)]
    location: Vec<String>,
    title: Option<String>,
}

/// First `<location>` of every `<track>`, resolved against the playlist URI
pub(crate) fn parse(content: &str, base: &EntryBase, emit: &mut dyn FnMut(ParsedEntry)) -> ParseResult {
    let document: XspfDocument = match quick_xml::de::from_str(content) {
        Ok(document) => document,
        Err(e) => return ParseResult::Failure(format!("invalid XSPF: {}", e)),
    };

    for track in document.track_list.tracks {
        let Some(location) = track.location.into_iter().map(|l| l.trim().to_string()).find(|l| !l.is_empty())
        else {
            tracing::debug!("XSPF track without a location, skipping");
            continue;
        };
        let title = track.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        emit(ParsedEntry::new(base.resolve_reference(&location), title));
    }

    ParseResult::Success
}
