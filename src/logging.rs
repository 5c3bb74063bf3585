//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Build the level filter. `RUST_LOG` wins over the configured level.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), settings)
}

/// Unparseable or empty directives fall back to the configured level.
fn filter_from(directives: Option<&str>, settings: &LoggingSettings) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(&settings.level))
}

/// Install the global subscriber.
///
/// Returns an error if a global subscriber was already set.
pub fn init_logging(
    settings: &LoggingSettings,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = env_filter(settings);

    if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(false))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(level: &str) -> LoggingSettings {
        LoggingSettings {
            level: level.to_string(),
            json: true,
        }
    }

    #[test]
    fn test_filter_uses_configured_level() {
        assert_eq!(filter_from(None, &settings("debug")).to_string(), "debug");
        assert_eq!(filter_from(Some("  "), &settings("warn")).to_string(), "warn");
    }

    #[test]
    fn test_env_directives_win() {
        let filter = filter_from(Some("tradewinds_state=trace"), &settings("info")).to_string();
        assert_eq!(filter, "tradewinds_state=trace");
    }

    #[test]
    fn test_bad_directives_fall_back() {
        let filter = filter_from(Some("tradewinds_state=loud"), &settings("error")).to_string();
        assert_eq!(filter, "error");
    }
}
