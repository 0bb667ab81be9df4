//! Logging setup for sieve.
//!
//! Library code only emits `tracing` events. Binaries call [`init`] once to
//! install a subscriber (requires the `tracing-subscriber` feature).
//!
//! # Environment Variables
//!
//! - `SIEVE_DEBUG=true|1|yes` - Enable debug logging
//! - `SIEVE_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SIEVE_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use sieve_query::logging;
//!
//! logging::init();
//! ```

use std::sync::Once;

use crate::env::{EnvSource, StdEnvSource};

static INIT: Once = Once::new();

/// Resolved logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Level directive applied to the sieve crates.
    pub level: &'static str,
    /// Output format.
    pub format: &'static str,
    /// Whether logging was requested at all.
    pub enabled: bool,
}

impl LogSettings {
    /// Resolve settings from an environment source.
    ///
    /// The level defaults to `debug` when `SIEVE_DEBUG` is set, otherwise `warn`.
    pub fn from_env(env: &impl EnvSource) -> Self {
        let debug = env.flag("SIEVE_DEBUG");
        let fallback = if debug { "debug" } else { "warn" };

        let requested = env.get("SIEVE_LOG_LEVEL");
        let level = match requested.as_deref().map(str::to_lowercase).as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => fallback,
        };

        let format = match env.get("SIEVE_LOG_FORMAT").map(|f| f.to_lowercase()).as_deref() {
            Some("pretty") => "pretty",
            Some("compact") => "compact",
            _ => "json",
        };

        Self {
            level,
            format,
            enabled: debug || requested.is_some(),
        }
    }

    /// `EnvFilter` directive covering every sieve crate.
    pub fn directive(&self) -> String {
        ["sieve", "sieve_query", "sieve_postgres", "sieve_axum", "sieve_server"]
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Check if debug logging is enabled via `SIEVE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    StdEnvSource.flag("SIEVE_DEBUG")
}

/// Initialize logging from the process environment.
///
/// Subsequent calls are no-ops. Nothing is installed unless `SIEVE_DEBUG`
/// or `SIEVE_LOG_LEVEL` is set.
pub fn init() {
    init_with(LogSettings::from_env(&StdEnvSource));
}

/// Initialize logging at a fixed level, ignoring the environment's level.
pub fn init_with_level(level: &'static str) {
    let settings = LogSettings {
        level,
        enabled: true,
        ..LogSettings::from_env(&StdEnvSource)
    };
    init_with(settings);
}

fn init_with(settings: LogSettings) {
    INIT.call_once(|| {
        if !settings.enabled {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(settings.directive())
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            match settings.format {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
            }

            tracing::info!(
                level = settings.level,
                format = settings.format,
                "Sieve logging initialized"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnvSource;

    #[test]
    fn test_disabled_by_default() {
        let settings = LogSettings::from_env(&MapEnvSource::new());
        assert!(!settings.enabled);
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.format, "json");
    }

    #[test]
    fn test_debug_flag_raises_level() {
        let env = MapEnvSource::new().set("SIEVE_DEBUG", "1");
        let settings = LogSettings::from_env(&env);
        assert!(settings.enabled);
        assert_eq!(settings.level, "debug");
    }

    #[test]
    fn test_explicit_level_and_format() {
        let env = MapEnvSource::new()
            .set("SIEVE_LOG_LEVEL", "INFO")
            .set("SIEVE_LOG_FORMAT", "compact");
        let settings = LogSettings::from_env(&env);
        assert_eq!(settings.level, "info");
        assert_eq!(settings.format, "compact");
        assert!(settings.directive().contains("sieve_query=info"));
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let env = MapEnvSource::new().set("SIEVE_LOG_LEVEL", "loud");
        assert_eq!(LogSettings::from_env(&env).level, "warn");
    }
}
