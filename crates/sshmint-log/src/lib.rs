// ABOUTME: Shared logging setup for sshmint binaries
// ABOUTME: init(verbosity) installs a stderr subscriber; RUST_LOG always wins

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Default level for a `-v` count: 0 → WARN, 1 → INFO, 2+ → DEBUG.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Logging to stderr at the level chosen by `-v`, RUST_LOG override.
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
