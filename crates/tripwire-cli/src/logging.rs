//! tracing-subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the filter follows `-q` / `-v`.

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub const fn default_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "info,chromiumoxide=warn",
        Verbosity::Debug => "debug",
    }
}

/// Install the global subscriber, writing compact lines to stderr
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    // a second init (tests) is not an error worth reporting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters() {
        assert_eq!(default_filter(Verbosity::Quiet), "error");
        assert_eq!(default_filter(Verbosity::Normal), "warn");
        assert!(default_filter(Verbosity::Verbose).starts_with("info"));
        assert_eq!(default_filter(Verbosity::Debug), "debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Debug);
    }
}
