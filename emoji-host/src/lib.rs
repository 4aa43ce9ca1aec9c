//! # EmojiArt Host
//!
//! Headless host for the EmojiArt editor core.
//!
//! The core is pure and never performs I/O. This crate supplies the pieces
//! around it: an HTTP image fetcher, a serial editing session that applies
//! input events and fetch results in order, and a CLI that replays a script
//! of input events and prints the composed frame.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p emoji-host -- --script events.json --background-url https://example.com/bg.png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - Viewport size, background URL, fetch timeout and editor settings
//! - `EditorSession` - Serial owner of the editor state plus its fetch tasks
//! - `HttpImageFetcher` - reqwest-backed `ImageFetcher`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod fetch;
pub mod session;

pub use fetch::{decode_data_uri, image_url, FetchError, HttpImageFetcher, ImageFetcher};
pub use session::{EditorSession, FetchCompletion};

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use emoji_core::{EditorConfig, InputEvent};
use thiserror::Error;

/// Errors raised while setting up a host run.
#[derive(Debug, Error)]
pub enum HostError {
    /// The event script could not be read.
    #[error("failed to read script {path}: {source}")]
    ScriptRead {
        /// Script path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The event script is not a JSON array of input events.
    #[error("invalid script {path}: {source}")]
    ScriptParse {
        /// Script path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Command-line arguments for emoji-art.
#[derive(Debug, Clone, Parser)]
#[command(name = "emoji-art")]
#[command(about = "Replay EmojiArt input events and print the resulting frame")]
#[command(version)]
pub struct CliArgs {
    /// Background image URL to load before replaying events
    #[arg(long, env = "EMOJI_ART_BACKGROUND")]
    pub background_url: Option<String>,

    /// JSON file holding an array of input events
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Viewport width in points
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Viewport height in points
    #[arg(long, default_value = "720")]
    pub height: u32,

    /// Give up on a background fetch after this many seconds
    #[arg(long, default_value = "30")]
    pub fetch_timeout_secs: u64,

    /// Screen font size for newly dropped emoji
    #[arg(long, default_value = "40")]
    pub emoji_size: f64,

    /// Pretty-print the frame JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Viewport width in points.
    pub width: u32,
    /// Viewport height in points.
    pub height: u32,
    /// Background to load at startup.
    pub background_url: Option<String>,
    /// Event script to replay.
    pub script: Option<PathBuf>,
    /// Per-request fetch timeout.
    pub fetch_timeout: Duration,
    /// Pretty-print output.
    pub pretty: bool,
    /// Editor settings.
    pub editor: EditorConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig {
    /// Create a new host configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 1280,
            height: 720,
            background_url: None,
            script: None,
            fetch_timeout: Duration::from_secs(30),
            pretty: false,
            editor: EditorConfig::default(),
        }
    }
}

impl From<CliArgs> for HostConfig {
    fn from(args: CliArgs) -> Self {
        let mut editor = EditorConfig::default();
        if args.emoji_size.is_finite() && args.emoji_size > 0.0 {
            editor.default_emoji_size = args.emoji_size;
        }
        Self {
            width: args.width,
            height: args.height,
            background_url: args.background_url,
            script: args.script,
            fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
            pretty: args.pretty,
            editor,
        }
    }
}

/// Load an event script: a JSON array of [`InputEvent`]s.
///
/// # Errors
///
/// Returns [`HostError`] if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> Result<Vec<InputEvent>, HostError> {
    let text = std::fs::read_to_string(path).map_err(|source| HostError::ScriptRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| HostError::ScriptParse {
        path: path.to_path_buf(),
        source,
    })
}
