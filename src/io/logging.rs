use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::model::config::LogConfig;

/// Diagnostics file used while the TUI owns the terminal
pub const LOG_FILE: &str = "todo.log";

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Route tracing output to todo.log in the data directory
pub fn init_file_logging(data_dir: &Path, config: &LogConfig) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;
    // A second init (tests, repeated runs in one process) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}

/// Level for CLI subcommands when RUST_LOG is unset. Failures are printed
/// by the handlers, so only errors go through tracing.
const CLI_LEVEL: &str = "error";

/// Route tracing output to stderr (CLI subcommands)
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CLI_LEVEL)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
