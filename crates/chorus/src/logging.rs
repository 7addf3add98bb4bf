//! Logging initialization driven by the `[logging]` config section.
//!
//! Logs go to stderr so stdout stays reserved for report output. The
//! `RUST_LOG` environment variable overrides everything; otherwise the
//! `--verbose` flag trumps the configured level, and `--json-logs`
//! trumps the configured format.

use chorus_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

/// The filter directive to use when `RUST_LOG` is unset.
fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config.level.clone()
    }
}

fn format_for(config: &LoggingConfig, json_logs: bool) -> LogFormat {
    if json_logs || config.format == "json" {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    }
}

/// Initialize the logging subsystem from config, with CLI overrides.
pub fn init(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));

    match format_for(config, json_logs) {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .with_ansi(true),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str, format: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: format.to_string(),
        }
    }

    #[test]
    fn test_verbose_flag_overrides_configured_level() {
        assert_eq!(filter_directive(&logging("warn", "pretty"), true), "debug");
        assert_eq!(filter_directive(&logging("warn", "pretty"), false), "warn");
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(format_for(&logging("info", "json"), false), LogFormat::Json);
        assert_eq!(format_for(&logging("info", "pretty"), true), LogFormat::Json);
        assert_eq!(
            format_for(&logging("info", "pretty"), false),
            LogFormat::Pretty
        );
    }
}
