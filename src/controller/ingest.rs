//! Playlist ingestion
//!
//! Runs the playlist parser on a blocking worker and posts every valid
//! entry to the session bus, tagged with the generation of the `open` that
//! started it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;
use url::Url;

use crate::error::Result;
use crate::events::{EventSender, IngestReport, IngestUpdate, SessionEvent};
use crate::model::{normalize_uri, MediaReference};
use crate::parser::{ParseOptions, ParseResult, ParsedEntry, PlaylistParser};

/// Nested playlists are not followed and nothing remote is fetched
pub const INGEST_OPTIONS: ParseOptions = ParseOptions {
    recurse: false,
    disable_unsafe: true,
};

pub struct Ingestor<R: PlaylistParser> {
    parser: Arc<R>,
    bus: EventSender,
}

impl<R: PlaylistParser> Ingestor<R> {
    pub fn new(parser: R, bus: EventSender) -> Self {
        Self {
            parser: Arc::new(parser),
            bus,
        }
    }

    /// Start ingesting the playlist at `path`.
    ///
    /// Returns once the worker is spawned; entries arrive on the bus and the
    /// returned task resolves to the final report.
    pub fn start(&self, path: &str, generation: u64) -> Result<IngestTask> {
        let uri = normalize_uri(path)?;
        let parser = Arc::clone(&self.parser);
        let bus = self.bus.clone();

        tracing::info!(uri = %uri, generation, "Starting playlist ingestion");

        let handle = tokio::task::spawn_blocking(move || run_ingestion(parser.as_ref(), &uri, generation, &bus));

        Ok(IngestTask { generation, handle })
    }
}

/// Handle on a running ingestion; awaiting it yields the report
pub struct IngestTask {
    generation: u64,
    handle: JoinHandle<IngestReport>,
}

impl IngestTask {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Blocking workers cannot be interrupted once running; anything they
    /// still post is dropped by the session's generation check
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Future for IngestTask {
    type Output = IngestReport;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IngestReport> {
        Pin::new(&mut self.get_mut().handle).poll(cx).map(|joined| {
            joined.unwrap_or(IngestReport {
                count: 0,
                failed: true,
            })
        })
    }
}

fn run_ingestion<R: PlaylistParser + ?Sized>(
    parser: &R,
    uri: &Url,
    generation: u64,
    bus: &EventSender,
) -> IngestReport {
    let mut count = 0;

    let result = parser.parse(uri, INGEST_OPTIONS, &mut |entry: ParsedEntry| match media_from_entry(&entry) {
        Ok(media) => {
            count += 1;
            let _ = bus.send(SessionEvent::Ingest {
                generation,
                update: IngestUpdate::Entry(media),
            });
        }
        Err(e) => tracing::warn!(uri = %entry.uri, error = %e, "Skipping playlist entry"),
    });

    let failed = match result {
        ParseResult::Success => false,
        ParseResult::Failure(reason) => {
            tracing::warn!(uri = %uri, generation, count, reason = %reason, "Playlist parsing failed");
            true
        }
    };

    let report = IngestReport { count, failed };
    tracing::info!(uri = %uri, generation, count, failed, "Playlist parsing finished");

    let _ = bus.send(SessionEvent::Ingest {
        generation,
        update: IngestUpdate::Finished(report),
    });
    report
}

fn media_from_entry(entry: &ParsedEntry) -> Result<MediaReference> {
    let uri = normalize_uri(&entry.uri)?;
    MediaReference::new(entry.title(), uri.as_str())
}
