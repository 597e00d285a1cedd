//! Media pipeline backed by an external player process
//!
//! Each transition to `Playing` spawns the configured player with the
//! current URI. A watcher task turns the process exit into an end-of-stream
//! or error notification on the session bus.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::oneshot;
use url::Url;

use crate::error::{CoreError, Result};
use crate::events::{EventSender, PipelineMessage, PipelineNotification, SessionEvent, StreamId};

pub const DEFAULT_PLAYER: &str = "ffplay";
pub const DEFAULT_PLAYER_ARGS: [&str; 4] = ["-nodisp", "-autoexit", "-loglevel", "error"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Playing,
    Stopped,
}

/// Commands the session sends to whatever renders media
pub trait MediaPipeline {
    fn set_uri(&mut self, uri: &Url) -> Result<()>;

    fn set_state(&mut self, state: PipelineState) -> Result<()>;

    /// Stream that notifications must carry to be current
    fn stream_id(&self) -> StreamId;
}

pub struct ProcessPipeline {
    program: PathBuf,
    args: Vec<String>,
    bus: EventSender,
    uri: Option<Url>,
    stream: StreamId,
    running: Option<oneshot::Sender<()>>,
}

impl ProcessPipeline {
    /// Resolve the player executable and subscribe to the session bus.
    ///
    /// A player that cannot be found is `PipelineUnavailable`.
    pub fn acquire(program: &str, args: Vec<String>, bus: EventSender) -> Result<Self> {
        let program = which::which(program)
            .map_err(|e| CoreError::PipelineUnavailable(format!("'{}' player not found: {}", program, e)))?;

        tracing::info!(program = %program.display(), ?args, "Media pipeline acquired");

        Ok(Self {
            program,
            args,
            bus,
            uri: None,
            stream: 0,
            running: None,
        })
    }

    fn start(&mut self) -> Result<()> {
        let uri = self
            .uri
            .clone()
            .ok_or_else(|| CoreError::PipelineError("no URI set".to_string()))?;
        self.halt();

        let target = player_target(&uri);
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CoreError::PipelineError(format!("failed to start {}: {}", self.program.display(), e))
            })?;

        self.stream += 1;
        let stream = self.stream;
        let (stop_tx, stop_rx) = oneshot::channel();
        self.running = Some(stop_tx);

        let bus = self.bus.clone();
        let program = self.program.display().to_string();
        tracing::debug!(stream, target = %target, "Player process started");

        tokio::spawn(async move {
            tokio::select! {
                biased;

                // Dropping the child future kills the process
                _ = stop_rx => {
                    tracing::debug!(stream, "Player process stopped");
                }
                output = child.wait_with_output() => {
                    let notification = match output {
                        Ok(output) if output.status.success() => PipelineNotification::EndOfStream,
                        Ok(output) => {
                            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                            PipelineNotification::Error {
                                message: format!("{} exited with {}", program, output.status),
                                debug: (!stderr.is_empty()).then_some(stderr),
                            }
                        }
                        Err(e) => PipelineNotification::Error {
                            message: format!("lost track of {}: {}", program, e),
                            debug: None,
                        },
                    };
                    let _ = bus.send(SessionEvent::Pipeline(PipelineMessage { stream, notification }));
                }
            }
        });

        Ok(())
    }

    fn halt(&mut self) {
        if let Some(stop) = self.running.take() {
            let _ = stop.send(());
        }
    }
}

impl MediaPipeline for ProcessPipeline {
    fn set_uri(&mut self, uri: &Url) -> Result<()> {
        self.uri = Some(uri.clone());
        Ok(())
    }

    fn set_state(&mut self, state: PipelineState) -> Result<()> {
        match state {
            PipelineState::Playing => self.start(),
            PipelineState::Stopped => {
                self.halt();
                Ok(())
            }
        }
    }

    fn stream_id(&self) -> StreamId {
        self.stream
    }
}

impl Drop for ProcessPipeline {
    fn drop(&mut self) {
        self.halt();
        tracing::debug!("Media pipeline released");
    }
}

/// Local files go to the player as paths, everything else as the URI
fn player_target(uri: &Url) -> String {
    if uri.scheme() == "file" {
        if let Ok(path) = uri.to_file_path() {
            return path.display().to_string();
        }
    }
    uri.as_str().to_string()
}
