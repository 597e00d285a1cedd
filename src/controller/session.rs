//! Playback session - mode, cursor and pipeline orchestration
//!
//! The session is owned by the UI task. User operations and bus events both
//! arrive there, one at a time, so none of the state below needs a lock.

use crate::error::{CoreError, Result};
use crate::events::{EventSender, IngestReport, IngestUpdate, SessionEvent};
use crate::log_pipeline_command;
use crate::model::{
    classify, normalize_uri, AppMode, MediaReference, PathString, PlaybackState, PlaylistStore, StopReason,
};
use crate::parser::PlaylistParser;
use crate::pipeline::{MediaPipeline, PipelineState};

use super::ingest::{IngestTask, Ingestor};

/// Read-only view of the session for rendering
#[derive(Clone, Debug, Default)]
pub struct SessionSnapshot {
    pub mode: AppMode,
    pub state: PlaybackState,
    pub entries: Vec<MediaReference>,
    pub current_index: usize,
    pub active_path: Option<String>,
    pub ingesting: bool,
    pub last_report: Option<IngestReport>,
    pub last_error: Option<String>,
    pub pipeline_available: bool,
}

impl SessionSnapshot {
    pub fn current_entry(&self) -> Option<&MediaReference> {
        match self.mode {
            AppMode::Playlist => self.entries.get(self.current_index),
            AppMode::SingleFile => None,
        }
    }
}

pub struct PlaybackSession<P: MediaPipeline, R: PlaylistParser> {
    pub(super) pipeline: Option<P>,
    unavailable_reason: Option<String>,
    ingestor: Ingestor<R>,
    ingest_task: Option<IngestTask>,
    pub(super) store: PlaylistStore,
    mode: AppMode,
    pub(super) state: PlaybackState,
    active_path: Option<PathString>,
    generation: u64,
    last_report: Option<IngestReport>,
    pub(super) last_error: Option<String>,
    closed: bool,
}

impl<P: MediaPipeline, R: PlaylistParser> PlaybackSession<P, R> {
    /// Create a session around whatever pipeline acquisition produced.
    ///
    /// A failed acquisition leaves the session usable for opening files, but
    /// every playback command reports `PipelineUnavailable`.
    pub fn new(pipeline: Result<P>, parser: R, bus: EventSender) -> Self {
        let (pipeline, unavailable_reason) = match pipeline {
            Ok(pipeline) => (Some(pipeline), None),
            Err(e) => {
                tracing::error!(error = %e, "Media pipeline could not be acquired");
                (None, Some(e.to_string()))
            }
        };

        Self {
            pipeline,
            unavailable_reason,
            ingestor: Ingestor::new(parser, bus),
            ingest_task: None,
            store: PlaylistStore::new(),
            mode: AppMode::default(),
            state: PlaybackState::Idle,
            active_path: None,
            generation: 0,
            last_report: None,
            last_error: None,
            closed: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active_path.as_ref().map(|p| p.as_str())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_report(&self) -> Option<IngestReport> {
        self.last_report
    }

    pub fn is_ingesting(&self) -> bool {
        self.ingest_task.is_some()
    }

    pub fn pipeline_available(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            state: self.state.clone(),
            entries: self.store.entries().to_vec(),
            current_index: self.store.current_index(),
            active_path: self.active_path().map(str::to_string),
            ingesting: self.is_ingesting(),
            last_report: self.last_report,
            last_error: self.last_error.clone(),
            pipeline_available: self.pipeline_available(),
        }
    }

    // ========================================================================
    // User operations
    // ========================================================================

    /// Open a file or playlist.
    ///
    /// Playlists are ingested in the background: this returns before any
    /// entry has arrived, and `play` in the meantime sees only what has
    /// arrived so far.
    pub fn open(&mut self, path: &str) -> Result<AppMode> {
        let path = PathString::new(path);
        let mode = classify(&path);
        tracing::info!(path = %path, ?mode, "Opening");

        self.active_path = Some(path.clone());
        self.mode = mode;

        if mode == AppMode::Playlist {
            self.cancel_ingestion();
            self.store.clear();
            self.generation += 1;
            self.last_report = None;

            let task = self.ingestor.start(&path, self.generation)?;
            self.ingest_task = Some(task);
        }

        Ok(mode)
    }

    /// Play the current URI from the start
    pub fn play(&mut self) -> Result<()> {
        self.ensure_pipeline()?;
        let target = self.current_uri()?;
        let uri = normalize_uri(&target)?;

        tracing::info!(uri = %uri, mode = ?self.mode, "Play");
        self.command("set_uri", |pipeline| pipeline.set_uri(&uri))?;
        self.command("play", |pipeline| pipeline.set_state(PipelineState::Playing))?;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Advance to the next playlist entry, wrapping at the end, and play it
    pub fn next(&mut self) -> Result<()> {
        if self.mode != AppMode::Playlist {
            return Err(CoreError::NotPlaylistMode);
        }
        if self.store.is_empty() {
            return Err(CoreError::EmptyPlaylist);
        }
        self.ensure_pipeline()?;

        self.command("stop", |pipeline| pipeline.set_state(PipelineState::Stopped))?;
        let uri = normalize_uri(self.store.advance()?.uri())?;

        tracing::info!(uri = %uri, index = self.store.current_index(), "Next");
        self.command("set_uri", |pipeline| pipeline.set_uri(&uri))?;
        self.command("play", |pipeline| pipeline.set_state(PipelineState::Playing))?;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.ensure_pipeline()?;
        self.command("stop", |pipeline| pipeline.set_state(PipelineState::Stopped))?;
        self.state = PlaybackState::Stopped(StopReason::UserStopped);
        Ok(())
    }

    // ========================================================================
    // Bus events
    // ========================================================================

    /// Apply one bus event.
    ///
    /// Returns an error worth showing to the user, if the event carried one.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<CoreError> {
        match event {
            SessionEvent::Ingest { generation, update } => self.handle_ingest(generation, update),
            SessionEvent::Pipeline(message) => self.handle_pipeline_message(message),
        }
    }

    fn handle_ingest(&mut self, generation: u64, update: IngestUpdate) -> Option<CoreError> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Discarding stale ingestion event");
            return None;
        }

        match update {
            IngestUpdate::Entry(media) => {
                tracing::trace!(title = %media.title(), uri = %media.uri(), "Playlist entry");
                self.store.push(media);
                None
            }
            IngestUpdate::Finished(report) => {
                self.ingest_task = None;
                self.last_report = Some(report);
                report.failed.then(|| CoreError::PlaylistParseFailed {
                    partial: report.count > 0,
                })
            }
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Stop playback and release the pipeline and every playlist entry
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(mut pipeline) = self.pipeline.take() {
            let result = pipeline.set_state(PipelineState::Stopped);
            log_pipeline_command!("stop", result);
        }
        self.cancel_ingestion();

        let released = self.store.len();
        self.store.clear();
        tracing::info!(released, "Playback session closed");
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn current_uri(&self) -> Result<String> {
        match self.mode {
            AppMode::Playlist => self
                .store
                .current()
                .map(|media| media.uri().to_string())
                .ok_or(CoreError::NoCurrentMedia),
            AppMode::SingleFile => self
                .active_path
                .as_ref()
                .map(|path| path.to_string())
                .ok_or(CoreError::NoCurrentMedia),
        }
    }

    fn ensure_pipeline(&self) -> Result<()> {
        if self.pipeline.is_some() {
            return Ok(());
        }
        Err(CoreError::PipelineUnavailable(
            self.unavailable_reason
                .clone()
                .unwrap_or_else(|| "not initialized".to_string()),
        ))
    }

    /// Run one pipeline command; a rejected command stops the session with
    /// the error
    pub(super) fn command(&mut self, name: &'static str, f: impl FnOnce(&mut P) -> Result<()>) -> Result<()> {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return self.ensure_pipeline();
        };

        let result = f(pipeline);
        log_pipeline_command!(name, result);

        if let Err(e) = &result {
            let message = stop_message(e);
            self.state = PlaybackState::Stopped(StopReason::Error(message.clone()));
            self.last_error = Some(message);
        }
        result
    }

    fn cancel_ingestion(&mut self) {
        if let Some(task) = self.ingest_task.take() {
            tracing::debug!(generation = task.generation(), "Cancelling ingestion");
            task.abort();
        }
    }
}

/// Text recorded in `Stopped(Error(..))` and `last_error`; pipeline errors
/// keep the pipeline's own message, as bus errors do
fn stop_message(error: &CoreError) -> String {
    match error {
        CoreError::PipelineError(message) => message.clone(),
        other => other.to_string(),
    }
}

impl<P: MediaPipeline, R: PlaylistParser> Drop for PlaybackSession<P, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::{pump_ingestion, FakePipeline, PipelineCommand, ScriptedParser};
    use crate::events::{self, EventReceiver, PipelineMessage, PipelineNotification};

    type TestSession = PlaybackSession<FakePipeline, ScriptedParser>;

    fn three_tracks() -> ScriptedParser {
        ScriptedParser::new(vec![
            (Some("One"), "file:///music/1.mp3"),
            (Some("Two"), "file:///music/2.mp3"),
            (Some("Three"), "file:///music/3.mp3"),
        ])
    }

    fn session_with(parser: ScriptedParser) -> (TestSession, FakePipeline, EventReceiver) {
        let (bus, rx) = events::channel();
        let pipeline = FakePipeline::new();
        let session = PlaybackSession::new(Ok(pipeline.clone()), parser, bus);
        (session, pipeline, rx)
    }

    fn end_of_stream(pipeline: &FakePipeline) -> SessionEvent {
        SessionEvent::Pipeline(PipelineMessage {
            stream: pipeline.stream_id(),
            notification: PipelineNotification::EndOfStream,
        })
    }

    #[tokio::test]
    async fn playlist_scenario_open_play_eos_next() {
        let (mut session, pipeline, mut rx) = session_with(three_tracks());

        assert_eq!(session.open("list.m3u").unwrap(), AppMode::Playlist);
        pump_ingestion(&mut session, &mut rx).await;
        assert_eq!(session.store().len(), 3);

        session.play().unwrap();
        assert_eq!(session.state(), &PlaybackState::Playing);
        assert_eq!(
            pipeline.commands(),
            vec![
                PipelineCommand::SetUri("file:///music/1.mp3".into()),
                PipelineCommand::SetState(PipelineState::Playing),
            ]
        );

        assert!(session.handle_event(end_of_stream(&pipeline)).is_none());
        assert_eq!(session.state(), &PlaybackState::Stopped(StopReason::EndOfStream));
        assert_eq!(session.store().len(), 3);
        assert_eq!(session.store().current_index(), 0);
        assert_eq!(pipeline.last_command(), Some(PipelineCommand::SetState(PipelineState::Stopped)));

        pipeline.clear_commands();
        session.next().unwrap();
        assert_eq!(session.store().current_index(), 1);
        assert_eq!(
            pipeline.commands(),
            vec![
                PipelineCommand::SetState(PipelineState::Stopped),
                PipelineCommand::SetUri("file:///music/2.mp3".into()),
                PipelineCommand::SetState(PipelineState::Playing),
            ]
        );
    }

    #[tokio::test]
    async fn reopening_resets_cursor_without_duplicates() {
        let (mut session, _pipeline, mut rx) = session_with(three_tracks());

        session.open("list.m3u").unwrap();
        pump_ingestion(&mut session, &mut rx).await;
        session.next().unwrap();
        assert_eq!(session.store().current_index(), 1);

        session.open("list.m3u").unwrap();
        assert_eq!(session.store().current_index(), 0);
        pump_ingestion(&mut session, &mut rx).await;

        assert_eq!(session.store().len(), 3);
        assert_eq!(session.store().current_index(), 0);
        assert_eq!(session.generation(), 2);
    }

    #[tokio::test]
    async fn stale_ingestion_events_are_discarded() {
        let (mut session, _pipeline, mut rx) = session_with(three_tracks());

        session.open("old.m3u").unwrap();
        session.open("new.pls").unwrap();
        pump_ingestion(&mut session, &mut rx).await;
        assert_eq!(session.store().len(), 3);

        // late arrivals from the first open
        let late_entry = SessionEvent::Ingest {
            generation: 1,
            update: IngestUpdate::Entry(MediaReference::new(None, "file:///late.mp3").unwrap()),
        };
        let late_finish = SessionEvent::Ingest {
            generation: 1,
            update: IngestUpdate::Finished(IngestReport { count: 9, failed: true }),
        };
        assert!(session.handle_event(late_entry).is_none());
        assert!(session.handle_event(late_finish).is_none());

        assert_eq!(session.store().len(), 3);
        assert_eq!(session.last_report(), Some(IngestReport { count: 3, failed: false }));
    }

    #[tokio::test]
    async fn wraparound_after_len_nexts() {
        let (mut session, _pipeline, mut rx) = session_with(three_tracks());
        session.open("list.xspf").unwrap();
        pump_ingestion(&mut session, &mut rx).await;

        for _ in 0..3 {
            session.next().unwrap();
        }
        assert_eq!(session.store().current_index(), 0);
    }

    #[tokio::test]
    async fn next_on_empty_playlist_leaves_pipeline_alone() {
        let (mut session, pipeline, mut rx) = session_with(ScriptedParser::new(vec![]));
        session.open("empty.m3u").unwrap();
        pump_ingestion(&mut session, &mut rx).await;

        assert_eq!(session.next().unwrap_err(), CoreError::EmptyPlaylist);
        assert!(pipeline.commands().is_empty());
        assert_eq!(session.state(), &PlaybackState::Idle);
    }

    #[tokio::test]
    async fn play_before_entries_arrive_has_no_media() {
        let (mut session, pipeline, _rx) = session_with(three_tracks());
        session.open("list.m3u").unwrap();

        // Nothing has been applied from the bus yet
        assert_eq!(session.play().unwrap_err(), CoreError::NoCurrentMedia);
        assert!(pipeline.commands().is_empty());
    }

    #[tokio::test]
    async fn ingestion_keeps_titles_and_absent_titles() {
        let parser = ScriptedParser::new(vec![(Some("Song A"), "file:///a.mp3"), (None, "file:///b.mp3")]);
        let (mut session, _pipeline, mut rx) = session_with(parser);

        session.open("list.m3u").unwrap();
        pump_ingestion(&mut session, &mut rx).await;

        let store = session.store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().title(), "Song A");
        assert!(!store.get(1).unwrap().has_title());
    }

    #[tokio::test]
    async fn parse_failure_keeps_partial_entries() {
        let parser = ScriptedParser::new(vec![(None, "file:///a.mp3")]).failing("bad line");
        let (mut session, _pipeline, mut rx) = session_with(parser);

        session.open("broken.pls").unwrap();
        let surfaced = pump_ingestion(&mut session, &mut rx).await;

        assert_eq!(surfaced, Some(CoreError::PlaylistParseFailed { partial: true }));
        assert_eq!(session.store().len(), 1);
        session.play().unwrap();
    }

    #[tokio::test]
    async fn pipeline_error_stops_but_keeps_playlist() {
        let (mut session, pipeline, mut rx) = session_with(three_tracks());
        session.open("list.m3u").unwrap();
        pump_ingestion(&mut session, &mut rx).await;
        session.next().unwrap();

        let surfaced = session.handle_event(SessionEvent::Pipeline(PipelineMessage {
            stream: pipeline.stream_id(),
            notification: PipelineNotification::Error {
                message: "decoder missing".into(),
                debug: Some("no codec for mp3".into()),
            },
        }));

        assert_eq!(surfaced, Some(CoreError::PipelineError("decoder missing".into())));
        assert_eq!(
            session.state(),
            &PlaybackState::Stopped(StopReason::Error("decoder missing".into()))
        );
        assert_eq!(session.last_error(), Some("decoder missing"));
        assert_eq!(session.store().len(), 3);
        assert_eq!(session.store().current_index(), 1);

        // still usable
        session.play().unwrap();
        assert_eq!(session.state(), &PlaybackState::Playing);
    }

    #[tokio::test]
    async fn notifications_from_replaced_streams_are_ignored() {
        let (mut session, pipeline, mut rx) = session_with(three_tracks());
        session.open("list.m3u").unwrap();
        pump_ingestion(&mut session, &mut rx).await;
        session.play().unwrap();

        let stale = end_of_stream(&pipeline);
        session.next().unwrap();
        session.handle_event(stale);

        assert_eq!(session.state(), &PlaybackState::Playing);
    }

    #[test]
    fn single_file_plays_the_bare_path() {
        let (mut session, pipeline, _rx) = session_with(ScriptedParser::new(vec![]));

        assert_eq!(session.open("/music/song.mp3").unwrap(), AppMode::SingleFile);
        session.play().unwrap();

        assert_eq!(
            pipeline.commands()[0],
            PipelineCommand::SetUri("file:///music/song.mp3".into())
        );
        assert_eq!(session.next().unwrap_err(), CoreError::NotPlaylistMode);
    }

    #[test]
    fn play_with_nothing_opened_fails() {
        let (mut session, _pipeline, _rx) = session_with(ScriptedParser::new(vec![]));
        assert_eq!(session.play().unwrap_err(), CoreError::NoCurrentMedia);
    }

    #[test]
    fn missing_pipeline_fails_every_playback_command() {
        let (bus, _rx) = events::channel();
        let mut session: TestSession = PlaybackSession::new(
            Err(CoreError::PipelineUnavailable("'ffplay' player not found".into())),
            ScriptedParser::new(vec![]),
            bus,
        );

        session.open("/music/song.mp3").unwrap();
        assert!(matches!(session.play(), Err(CoreError::PipelineUnavailable(_))));
        assert!(matches!(session.play(), Err(CoreError::PipelineUnavailable(_))));
        assert!(matches!(session.stop(), Err(CoreError::PipelineUnavailable(_))));
        assert_eq!(session.state(), &PlaybackState::Idle);
        assert!(!session.snapshot().pipeline_available);
    }

    #[test]
    fn rejected_command_surfaces_as_stopped_error() {
        let (mut session, pipeline, _rx) = session_with(ScriptedParser::new(vec![]));
        pipeline.fail_with("device busy");
        session.open("/music/song.mp3").unwrap();

        assert_eq!(session.play().unwrap_err(), CoreError::PipelineError("device busy".into()));
        assert_eq!(
            session.state(),
            &PlaybackState::Stopped(StopReason::Error("device busy".into()))
        );
        assert_eq!(session.last_error(), Some("device busy"));
    }

    #[test]
    fn rejected_and_reported_errors_read_the_same() {
        let (mut session, pipeline, _rx) = session_with(ScriptedParser::new(vec![]));
        session.open("/music/song.mp3").unwrap();
        session.play().unwrap();

        session.handle_event(SessionEvent::Pipeline(PipelineMessage {
            stream: pipeline.stream_id(),
            notification: PipelineNotification::Error {
                message: "device busy".into(),
                debug: None,
            },
        }));
        let reported = session.state().clone();

        session.open("/music/other.mp3").unwrap();
        pipeline.fail_with("device busy");
        let _ = session.play();

        assert_eq!(session.state(), &reported);
    }

    #[test]
    fn queued_end_of_stream_does_not_override_user_stop() {
        let (mut session, pipeline, _rx) = session_with(ScriptedParser::new(vec![]));
        session.open("/music/song.mp3").unwrap();
        session.play().unwrap();
        let queued = end_of_stream(&pipeline);

        session.stop().unwrap();
        pipeline.clear_commands();
        assert!(session.handle_event(queued).is_none());

        assert_eq!(session.state(), &PlaybackState::Stopped(StopReason::UserStopped));
        assert!(pipeline.commands().is_empty());
    }

    #[test]
    fn failed_stop_at_end_of_stream_stays_visible() {
        let (mut session, pipeline, _rx) = session_with(ScriptedParser::new(vec![]));
        session.open("/music/song.mp3").unwrap();
        session.play().unwrap();
        pipeline.fail_with("device gone");

        let surfaced = session.handle_event(end_of_stream(&pipeline));

        assert_eq!(surfaced, Some(CoreError::PipelineError("device gone".into())));
        assert_eq!(
            session.state(),
            &PlaybackState::Stopped(StopReason::Error("device gone".into()))
        );
        assert_eq!(session.last_error(), Some("device gone"));
    }

    #[test]
    fn user_stop_is_recorded() {
        let (mut session, pipeline, _rx) = session_with(ScriptedParser::new(vec![]));
        session.open("/music/song.mp3").unwrap();
        session.play().unwrap();
        session.stop().unwrap();

        assert_eq!(session.state(), &PlaybackState::Stopped(StopReason::UserStopped));
        assert_eq!(pipeline.last_command(), Some(PipelineCommand::SetState(PipelineState::Stopped)));
    }

    #[tokio::test]
    async fn close_stops_pipeline_and_releases_once() {
        let (mut session, pipeline, mut rx) = session_with(three_tracks());
        session.open("list.m3u").unwrap();
        pump_ingestion(&mut session, &mut rx).await;
        session.play().unwrap();
        pipeline.clear_commands();

        session.close();

        assert_eq!(pipeline.commands(), vec![PipelineCommand::SetState(PipelineState::Stopped)]);
        assert_eq!(pipeline.holders(), 1, "session must have dropped its pipeline handle");
    }

    #[test]
    fn long_paths_are_bounded() {
        let (mut session, _pipeline, _rx) = session_with(ScriptedParser::new(vec![]));
        let path = format!("/music/{}.mp3", "x".repeat(300));

        session.open(&path).unwrap();
        assert_eq!(session.active_path().unwrap().len(), 255);
    }
}
