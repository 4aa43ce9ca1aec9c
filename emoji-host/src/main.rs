//! # EmojiArt
//!
//! Headless runner: replays a script of input events against a fresh
//! document and prints the composed frame as JSON.

use clap::Parser;
use emoji_host::{load_script, CliArgs, EditorSession, HostConfig, HttpImageFetcher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,emoji_core=debug,emoji_host=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,emoji_core=debug,emoji_host=debug"));

    // Logs go to stderr; stdout carries the frame.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = HostConfig::from(CliArgs::parse());
    tracing::info!(
        width = config.width,
        height = config.height,
        "Starting EmojiArt"
    );

    let events = match &config.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let fetcher = HttpImageFetcher::new(config.fetch_timeout)?;
    let mut session = EditorSession::new(
        fetcher,
        f64::from(config.width),
        f64::from(config.height),
        config.editor.clone(),
    );

    tracing::debug!(glyphs = session.state().palette().len(), "Palette loaded");

    let mut changes = 0;
    if let Some(url) = &config.background_url {
        tracing::info!(%url, "Loading background");
        changes += session.set_background_url(url).len();
        changes += session.settle().await.len();
    }

    tracing::debug!(count = events.len(), "Replaying events");
    for event in &events {
        changes += session.handle(event).len();
    }
    changes += session.settle().await.len();

    let frame = session.frame();
    let output = if config.pretty {
        serde_json::to_string_pretty(&frame)?
    } else {
        serde_json::to_string(&frame)?
    };
    println!("{output}");

    tracing::info!(
        items = frame.items.len(),
        revision = frame.revision,
        changes,
        "EmojiArt finished"
    );
    Ok(())
}
