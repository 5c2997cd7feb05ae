//! Logging setup
//!
//! One `tracing-subscriber` fmt layer on stderr. `RUST_LOG` wins over the
//! `-v` count when set.

use tracing_subscriber::EnvFilter;

/// Default filter for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "xfboard=warn",
        1 => "xfboard=info",
        2 => "xfboard=debug",
        _ => "xfboard=trace",
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "xfboard=warn");
        assert_eq!(default_directive(2), "xfboard=debug");
        assert_eq!(default_directive(9), "xfboard=trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(0);
        init_logging(3);
    }
}
