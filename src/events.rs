//! Session event bus
//!
//! The pipeline watcher and the playlist parser run off the UI task. They
//! never touch session state directly; everything they report is posted
//! here and applied by the UI loop in delivery order.

use tokio::sync::mpsc;

use crate::model::MediaReference;

/// Identifies one pipeline run; bumped each time the pipeline starts playing
pub type StreamId = u64;

/// Bus notifications from the media pipeline
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineNotification {
    EndOfStream,
    Error {
        message: String,
        debug: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineMessage {
    pub stream: StreamId,
    pub notification: PipelineNotification,
}

/// Outcome of one ingestion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub count: usize,
    pub failed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestUpdate {
    Entry(MediaReference),
    Finished(IngestReport),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Ingest { generation: u64, update: IngestUpdate },
    Pipeline(PipelineMessage),
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
