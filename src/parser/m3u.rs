//! M3U and extended M3U

use super::{EntryBase, ParseResult, ParsedEntry};

const EXTINF: &str = "#EXTINF:";

/// `#EXTINF:<duration>,<title>` names the entry on the next location line
pub(crate) fn parse(content: &str, base: &EntryBase, emit: &mut dyn FnMut(ParsedEntry)) -> ParseResult {
    let mut pending_title: Option<String> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }

        if let Some(info) = line.strip_prefix(EXTINF) {
            pending_title = info
                .split_once(',')
                .map(|(_, title)| title.trim())
                .filter(|title| !title.is_empty())
                .map(str::to_string);
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        emit(ParsedEntry::new(base.resolve_path(line), pending_title.take()));
    }

    ParseResult::Success
}
