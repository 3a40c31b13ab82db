//! Logging initialization.
//!
//! Logs go to stderr so that `--report json` output on stdout stays parseable.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `verbosity`: 0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE. `RUST_LOG` is honored
/// as-is unless `-v` is given, which then sets the global level.
pub fn init(verbosity: u8, json: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(verbosity, rust_log.as_deref());

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn build_filter(verbosity: u8, rust_log: Option<&str>) -> EnvFilter {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    match rust_log {
        Some(directives) if verbosity == 0 => EnvFilter::builder()
            .parse(directives)
            .unwrap_or_else(|_| EnvFilter::new("warn")),
        Some(directives) => EnvFilter::builder()
            .parse(directives)
            .unwrap_or_else(|_| EnvFilter::new("warn"))
            .add_directive(level.into()),
        None => EnvFilter::new("warn").add_directive(level.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_rust_log_wins_without_verbose_flag() {
        let filter = build_filter(0, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_verbose_flag_sets_level() {
        assert_eq!(build_filter(0, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(build_filter(2, None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            build_filter(3, Some("info")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_invalid_rust_log_falls_back_to_warn() {
        let filter = build_filter(0, Some("conan_scan=notalevel"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
