//! Command-line configuration

use std::path::PathBuf;

use clap::Parser;

use crate::logging::DEFAULT_LOG_DIR;
use crate::pipeline::{DEFAULT_PLAYER, DEFAULT_PLAYER_ARGS};

/// Command-line arguments for playlist-player
#[derive(Parser, Debug)]
#[command(name = "playlist-player")]
#[command(about = "Terminal media player for single files and m3u/pls/xspf playlists")]
#[command(version)]
pub struct Config {
    /// File or playlist to open at startup
    pub path: Option<String>,

    /// Executable that plays one URI and exits at end of stream
    #[arg(long, default_value = DEFAULT_PLAYER, env = "PLAYLIST_PLAYER_CMD")]
    pub player: String,

    /// Argument passed to the player before the URI (repeatable)
    #[arg(long = "player-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub player_args: Vec<String>,

    /// Directory for the rolling log files
    #[arg(long, default_value = DEFAULT_LOG_DIR, env = "PLAYLIST_PLAYER_LOG_DIR")]
    pub log_dir: PathBuf,

    /// Start playing as soon as the startup path has something to play
    #[arg(long)]
    pub autoplay: bool,
}

impl Config {
    /// Player arguments, falling back to the defaults when none were given
    pub fn player_args(&self) -> Vec<String> {
        if self.player_args.is_empty() {
            DEFAULT_PLAYER_ARGS.iter().map(|arg| arg.to_string()).collect()
        } else {
            self.player_args.clone()
        }
    }
}
