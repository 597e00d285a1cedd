//! Media pipeline notifications

use crate::error::CoreError;
use crate::events::{PipelineMessage, PipelineNotification};
use crate::model::{PlaybackState, StopReason};
use crate::parser::PlaylistParser;
use crate::pipeline::{MediaPipeline, PipelineState};

use super::session::PlaybackSession;

impl<P: MediaPipeline, R: PlaylistParser> PlaybackSession<P, R> {
    /// End-of-stream and errors both halt the pipeline. Neither advances the
    /// playlist; `next` has to be requested explicitly.
    ///
    /// Only a stream that is still playing can end: anything queued before a
    /// user stop, or from a replaced stream, is dropped.
    pub(super) fn handle_pipeline_message(&mut self, message: PipelineMessage) -> Option<CoreError> {
        let current = self.pipeline.as_ref()?.stream_id();
        if message.stream != current {
            tracing::debug!(stream = message.stream, current, "Discarding notification from replaced stream");
            return None;
        }
        if !self.state.is_playing() {
            tracing::debug!(stream = current, state = %self.state, "Discarding notification for stopped stream");
            return None;
        }

        match message.notification {
            PipelineNotification::EndOfStream => {
                tracing::info!(stream = current, "End-of-stream");
                // A rejected stop leaves its own error state in place
                if let Err(e) = self.command("stop", |pipeline| pipeline.set_state(PipelineState::Stopped)) {
                    return Some(e);
                }
                self.state = PlaybackState::Stopped(StopReason::EndOfStream);
                None
            }
            PipelineNotification::Error { message, debug: debug_info } => {
                tracing::error!(
                    stream = current,
                    error = %message,
                    debug = debug_info.as_deref().unwrap_or("none"),
                    "Pipeline error"
                );
                // The bus error is what gets reported; a failed stop here is only logged
                let _ = self.command("stop", |pipeline| pipeline.set_state(PipelineState::Stopped));
                self.state = PlaybackState::Stopped(StopReason::Error(message.clone()));
                self.last_error = Some(message.clone());
                Some(CoreError::PipelineError(message))
            }
        }
    }
}
