//! Utilities for logging.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    /// Multi-line, human readable output.
    #[default]
    Pretty,
    /// One json object per line. Useful when logs are shipped somewhere.
    Json,
    /// Single line human readable output.
    Compact,
}

/// Map a `-v` count to a max log level.
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity when set. Calling this more
/// than once is a no-op.
pub fn init(verbosity: u8, mode: LoggingMode) {
    let level = level_from_verbosity(verbosity);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let builder = SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_thread_names(true);

    let _ = match mode {
        LoggingMode::Pretty => builder.pretty().try_init(),
        LoggingMode::Json => builder.json().try_init(),
        LoggingMode::Compact => builder.compact().try_init(),
    };
}

/// Initialize logging for tests, capturing output with the test harness.
pub fn init_test() {
    let _ = SubscriberBuilder::default()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(Level::INFO, level_from_verbosity(0));
        assert_eq!(Level::DEBUG, level_from_verbosity(1));
        assert_eq!(Level::TRACE, level_from_verbosity(2));
        assert_eq!(Level::TRACE, level_from_verbosity(9));
    }

    #[test]
    fn init_twice_is_noop() {
        init_test();
        init_test();
    }
}
