//! File-only logging.
//!
//! The terminal belongs to the UI, so nothing is ever written to stdout or
//! stderr while the app runs. Logs go to `deepwork.log` in the state dir.
//! `RUST_LOG` overrides the built-in filter.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

fn filter_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,deepwork=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber, appending to `log_path`.
pub fn init(log_path: &Path, verbose: bool) -> io::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose)));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .try_init()
        .map_err(io::Error::other)?;

    tracing::info!(log_file = ?log_path, verbose, "deepwork logging initialized");
    Ok(())
}
