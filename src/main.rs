mod config;
mod controller;
mod error;
mod events;
mod logging;
mod model;
mod parser;
mod pipeline;
mod view;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};

use config::Config;
use controller::{AppController, PlaybackSession};
use events::EventReceiver;
use parser::{FilePlaylistParser, PlaylistParser};
use pipeline::{MediaPipeline, ProcessPipeline};
use view::AppView;

/// Redraw interval while nothing else happens; keeps the error timeout moving
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {:#}", e);
    }

    tracing::info!("=== playlist-player starting ===");

    let (bus, mut events) = events::channel();
    let pipeline = ProcessPipeline::acquire(&config.player, config.player_args(), bus.clone());
    let session = PlaybackSession::new(pipeline, FilePlaylistParser::new(), bus);
    let mut controller = AppController::new(session);

    if let Some(path) = &config.path {
        controller.open_path(path);
        if config.autoplay {
            controller.request_autoplay();
        }
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut controller, &mut events).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    controller.shutdown();

    tracing::info!("playlist-player shutting down");
    Ok(())
}

async fn run_app<P: MediaPipeline, R: PlaylistParser>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut AppController<P, R>,
    events: &mut EventReceiver,
) -> io::Result<()> {
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK_INTERVAL);

    loop {
        // Auto-clear old errors (after 5 seconds)
        controller.ui_state_mut().auto_clear_old_errors();

        let snapshot = controller.session().snapshot();
        terminal.draw(|f| {
            AppView::render(f, &snapshot, controller.ui_state());
        })?;

        if controller.should_quit() {
            break;
        }

        // Keys and session events are applied one at a time, in arrival order
        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    if let Err(e) = controller.handle_key_event(key) {
                        tracing::warn!(error = %e, "Key handling failed");
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
            Some(event) = events.recv() => {
                controller.handle_session_event(event);
            }
            _ = tick.tick() => {}
        }
    }

    Ok(())
}
