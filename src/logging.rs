//! Logging Module
//!
//! Structured logging with file output for diagnostics.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with a rolling file under `log_dir` and a stderr layer.
///
/// `verbose` turns the console layer on in release builds too.
pub fn init(log_dir: &Path, verbose: bool) {
    // Ensure log directory exists
    let _ = std::fs::create_dir_all(log_dir);

    // Daily rotation
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "mottooth.log");

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_appender);

    // stdout carries command output, so the console layer goes to stderr
    let console_layer = (cfg!(debug_assertions) || verbose).then(|| {
        fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn default_filter(verbose: bool) -> EnvFilter {
    if cfg!(debug_assertions) || verbose {
        EnvFilter::new("debug,hyper=warn,reqwest=warn")
    } else {
        EnvFilter::new("info,hyper=warn,reqwest=warn")
    }
}
