//! Test doubles for the pipeline and the playlist parser

use std::sync::{Arc, Mutex};

use url::Url;

use crate::error::{CoreError, Result};
use crate::events::{EventReceiver, IngestUpdate, SessionEvent, StreamId};
use crate::parser::{ParseOptions, ParseResult, ParsedEntry, PlaylistParser};
use crate::pipeline::{MediaPipeline, PipelineState};

use super::session::PlaybackSession;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineCommand {
    SetUri(String),
    SetState(PipelineState),
}

#[derive(Default)]
struct FakePipelineInner {
    commands: Vec<PipelineCommand>,
    stream: StreamId,
    failure: Option<String>,
}

/// Records every command; clones share the same record
#[derive(Clone, Default)]
pub struct FakePipeline {
    inner: Arc<Mutex<FakePipelineInner>>,
}

impl FakePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<PipelineCommand> {
        self.inner.lock().unwrap().commands.clone()
    }

    pub fn last_command(&self) -> Option<PipelineCommand> {
        self.inner.lock().unwrap().commands.last().cloned()
    }

    pub fn clear_commands(&self) {
        self.inner.lock().unwrap().commands.clear();
    }

    /// Make every following command fail with `message`
    pub fn fail_with(&self, message: &str) {
        self.inner.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    fn record(&self, command: PipelineCommand) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.failure {
            return Err(CoreError::PipelineError(message.clone()));
        }
        if command == PipelineCommand::SetState(PipelineState::Playing) {
            inner.stream += 1;
        }
        inner.commands.push(command);
        Ok(())
    }
}

impl MediaPipeline for FakePipeline {
    fn set_uri(&mut self, uri: &Url) -> Result<()> {
        self.record(PipelineCommand::SetUri(uri.to_string()))
    }

    fn set_state(&mut self, state: PipelineState) -> Result<()> {
        self.record(PipelineCommand::SetState(state))
    }

    fn stream_id(&self) -> StreamId {
        self.inner.lock().unwrap().stream
    }
}

/// Reports a fixed list of entries, then succeeds or fails
#[derive(Clone, Default)]
pub struct ScriptedParser {
    entries: Vec<(Option<String>, String)>,
    failure: Option<String>,
    calls: Arc<Mutex<Vec<(Url, ParseOptions)>>>,
}

impl ScriptedParser {
    pub fn new(entries: Vec<(Option<&str>, &str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(title, uri)| (title.map(str::to_string), uri.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(Url, ParseOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlaylistParser for ScriptedParser {
    fn parse(&self, uri: &Url, options: ParseOptions, on_entry: &mut dyn FnMut(ParsedEntry)) -> ParseResult {
        self.calls.lock().unwrap().push((uri.clone(), options));
        for (title, entry_uri) in &self.entries {
            on_entry(ParsedEntry::new(entry_uri.clone(), title.clone()));
        }
        match &self.failure {
            Some(reason) => ParseResult::Failure(reason.clone()),
            None => ParseResult::Success,
        }
    }
}

/// Everything currently queued on the bus
pub fn drain(rx: &mut EventReceiver) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Apply bus events until the current ingestion finishes; returns what the
/// finish surfaced
pub async fn pump_ingestion<P: MediaPipeline, R: PlaylistParser>(
    session: &mut PlaybackSession<P, R>,
    rx: &mut EventReceiver,
) -> Option<CoreError> {
    loop {
        let event = rx.recv().await.expect("bus closed during ingestion");
        let finishes_current = matches!(
            &event,
            SessionEvent::Ingest { generation, update: IngestUpdate::Finished(_) }
                if *generation == session.generation()
        );
        let surfaced = session.handle_event(event);
        if finishes_current {
            return surfaced;
        }
    }
}
