// Logging configuration for Bingo Live

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset; the console shares the terminal with the display
pub const DEFAULT_LEVEL: Level = Level::WARN;

// Keep the guards alive for the lifetime of the program
static LOG_GUARD: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Initialize logging with optional console and file outputs.
///
/// # Arguments
/// * `enable_console` - If true, logs will be written to stderr (stdout carries the display)
/// * `log_file_path` - If Some, logs will be written to this file
/// * `verbose` - If true, DEBUG is enabled for this crate
pub fn init_logging(enable_console: bool, log_file_path: Option<PathBuf>, verbose: bool) {
    let mut guards = Vec::new();

    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let filter = build_filter(&env_directives, verbose);

    let file_layer = log_file_path.and_then(|path| {
        let parent = path.parent()?;
        let file_name = path.file_name()?.to_str()?;

        let file_appender = tracing_appender::rolling::never(parent, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
    });

    let console_layer = if enable_console {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
        guards.push(guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
    } else {
        None
    };

    // try_init: a second initialisation (tests, embedding) is not an error
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    let _ = LOG_GUARD.set(guards);
}

/// Build the filter from `RUST_LOG`-style directives, falling back to
/// `DEFAULT_LEVEL` when they are empty
fn build_filter(directives: &str, verbose: bool) -> EnvFilter {
    let mut filter = EnvFilter::builder()
        .with_default_directive(DEFAULT_LEVEL.into())
        .parse_lossy(directives);
    if verbose {
        if let Ok(directive) = "bingo_live=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}
