//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// `debug` selects the default level filter (`Debug` vs `Warn`); the
/// `RUST_LOG` environment variable still takes precedence when set. Safe
/// to call more than once; only the first call installs the sink.
pub fn init(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
