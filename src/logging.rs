//! Tracing setup for the binary
//!
//! The filter comes from `JSPLAY_LOG`, then `RUST_LOG`, defaulting to `warn`.
//! Batch mode logs to stderr. The TUI owns the terminal, so it logs to the
//! `--log-file` path when one is given and drops everything otherwise.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_ENV: &str = "JSPLAY_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Where log records go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Discard,
}

/// Filter directives from the environment, or the default
pub fn filter_directives() -> String {
    [LOG_ENV, EnvFilter::DEFAULT_ENV]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_new(filter_directives()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
pub fn init(target: LogTarget<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter();

    match target {
        LogTarget::Stderr => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()?;
            tracing::info!(path = %path.display(), "logging to file");
        }
        LogTarget::Discard => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()?;
        }
    }
    Ok(())
}
