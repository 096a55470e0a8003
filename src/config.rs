//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "tea-timer")]
#[command(about = "A persistent tea-brewing timer daemon")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted timer state and options
    #[arg(short, long, default_value = ".tea-timer")]
    pub data_dir: PathBuf,

    /// Command used to play the chime; the WAV path is appended
    #[arg(long, default_value = "aplay -q")]
    pub player: String,

    /// Do not play the alarm chime
    #[arg(long)]
    pub no_sound: bool,

    /// Do not post desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Split the player command into program and leading arguments
    pub fn player_command(&self) -> Option<(String, Vec<String>)> {
        let mut parts = self.player.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}
