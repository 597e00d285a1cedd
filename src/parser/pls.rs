//! PLS playlists

use std::collections::BTreeMap;

use super::{EntryBase, ParseResult, ParsedEntry};

#[derive(Default)]
struct Slot {
    file: Option<String>,
    title: Option<String>,
}

/// `FileN=` / `TitleN=` pairs under a `[playlist]` header, emitted in N order
pub(crate) fn parse(content: &str, base: &EntryBase, emit: &mut dyn FnMut(ParsedEntry)) -> ParseResult {
    let mut seen_header = false;
    let mut slots: BTreeMap<u32, Slot> = BTreeMap::new();

    for raw_line in content.lines() {
        let line = raw_line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            seen_header |= line.eq_ignore_ascii_case("[playlist]");
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if let Some(index) = key.strip_prefix("file").and_then(|n| n.parse::<u32>().ok()) {
            slots.entry(index).or_default().file = Some(value.to_string());
        } else if let Some(index) = key.strip_prefix("title").and_then(|n| n.parse::<u32>().ok()) {
            if !value.is_empty() {
                slots.entry(index).or_default().title = Some(value.to_string());
            }
        }
    }

    if !seen_header {
        return ParseResult::Failure("missing [playlist] section".to_string());
    }

    for (index, slot) in slots {
        match slot.file {
            Some(file) if !file.is_empty() => emit(ParsedEntry::new(base.resolve_path(&file), slot.title)),
            _ => tracing::debug!(index, "PLS entry without a file, skipping"),
        }
    }

    ParseResult::Success
}
