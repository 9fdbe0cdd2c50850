use std::path::PathBuf;
use std::sync::Once;

use tracing::Level;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

// Define log targets as constants
pub const EXTRACTION: &str = "wvs_extract";
pub const ALIGNMENT: &str = "wvs_alignment";
pub const MATCHING: &str = "wvs_match";
pub const TABULATION: &str = "wvs_tabulate";

const CRATE_TARGETS: &[&str] = &[EXTRACTION, ALIGNMENT, MATCHING, TABULATION, "wvs_align"];

const LOG_FILE_NAME: &str = "wvs-align.log";

static INIT: Once = Once::new();

fn crate_filter(base: EnvFilter, level: Level) -> EnvFilter {
    CRATE_TARGETS.iter().fold(base, |filter, target| {
        match format!("{target}={}", level.as_str().to_lowercase()).parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    })
}

/// Installs the global subscriber.
///
/// Diagnostics always go to stdout. When `log_dir` is given every event at
/// `debug` and above is also written to `wvs-align.log` inside it, and the
/// returned guard must be held until the program exits so the file writer
/// flushes. Repeated calls are no-ops.
pub fn init_logging(verbose: bool, log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let mut guard = None;

    INIT.call_once(|| {
        let stdout_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(crate_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                if verbose { Level::DEBUG } else { Level::INFO },
            ));

        let file_layer = log_dir.and_then(|dir| {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("Failed to create log directory {}: {e}", dir.display());
                return None;
            }
            let file_appender = RollingFileAppender::new(Rotation::NEVER, dir, LOG_FILE_NAME);
            let (writer, worker_guard) = tracing_appender::non_blocking(file_appender);
            guard = Some(worker_guard);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(writer)
                    .with_filter(crate_filter(EnvFilter::new("warn"), Level::DEBUG)),
            )
        });

        let _ = tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .try_init();
    });

    guard
}
