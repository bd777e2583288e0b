//! Structured tracing setup.

use erp_config::{LogConfig, LogFormat};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive could not be parsed.
    #[error("invalid log filter `{filter}`: {source}")]
    InvalidFilter {
        /// Directive that failed.
        filter: String,
        /// Parser error.
        source: ParseError,
    },
    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialised: {reason}")]
    AlreadyInitialized {
        /// Message from `tracing-subscriber`.
        reason: String,
    },
}

/// Installs the process-wide subscriber. Output goes to stderr; `RUST_LOG`
/// takes precedence over [`LogConfig::filter`].
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for a bad directive or
/// [`TelemetryError::AlreadyInitialized`] when called twice.
pub fn init(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config, std::env::var(EnvFilter::DEFAULT_ENV).ok())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Text => builder.compact().try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    installed.map_err(|err| TelemetryError::AlreadyInitialized {
        reason: err.to_string(),
    })?;
    debug!(format = %config.format, "tracing subscriber installed");
    Ok(())
}

// A set but malformed `RUST_LOG` is an error, not a silent fallback.
fn build_filter(config: &LogConfig, env: Option<String>) -> Result<EnvFilter, TelemetryError> {
    let directive = env.unwrap_or_else(|| config.filter.clone());
    EnvFilter::try_new(&directive).map_err(|source| TelemetryError::InvalidFilter {
        filter: directive,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_configured_filter() {
        let config = LogConfig {
            filter: "erp=notalevel".into(),
            ..LogConfig::default()
        };
        let err = build_filter(&config, None).expect_err("bad directive");
        assert!(matches!(err, TelemetryError::InvalidFilter { ref filter, .. } if filter == "erp=notalevel"));
    }

    #[test]
    fn malformed_env_filter_is_reported() {
        let err = build_filter(&LogConfig::default(), Some("erp=loudest".into()))
            .expect_err("bad RUST_LOG");
        assert!(matches!(err, TelemetryError::InvalidFilter { ref filter, .. } if filter == "erp=loudest"));
    }

    #[test]
    fn env_filter_wins_over_configured_filter() {
        let config = LogConfig {
            filter: "erp=notalevel".into(),
            ..LogConfig::default()
        };
        build_filter(&config, Some("debug".into())).expect("RUST_LOG is used");
    }

    #[test]
    fn default_filter_parses() {
        build_filter(&LogConfig::default(), None).expect("info is valid");
    }
}
