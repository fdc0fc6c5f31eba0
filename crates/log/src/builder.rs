//! Logger builder implementation

use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format};
use crate::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Returned by a successful initialisation.
///
/// A no-op guard means a global subscriber was already installed and this
/// call left it in place.
#[derive(Debug)]
#[must_use = "keep the guard for the lifetime of the process"]
pub struct LoggerGuard {
    active: bool,
}

impl LoggerGuard {
    fn noop() -> Self {
        Self { active: false }
    }

    /// Whether this call installed the global subscriber.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and initialize the logger
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Filter`] if the filter string cannot be parsed and
    /// [`LogError::Init`] if the subscriber cannot be installed.
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {e}", self.config.level)))?;

        if tracing::dispatcher::has_been_set() {
            tracing::debug!("global subscriber already installed; keeping it");
            return Ok(LoggerGuard::noop());
        }

        let display = &self.config.display;
        let registry = Registry::default().with(filter);

        let installed = match self.config.format {
            Format::Pretty => registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_ansi(display.colors)
                        .with_target(display.target)
                        .with_file(display.source)
                        .with_line_number(display.source)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            Format::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(display.colors)
                        .with_target(display.target)
                        .with_file(display.source)
                        .with_line_number(display.source)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            Format::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_current_span(true)
                        .with_target(display.target)
                        .with_file(display.source)
                        .with_line_number(display.source)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
        };

        installed.map_err(|e| LogError::Init(e.to_string()))?;
        Ok(LoggerGuard { active: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_rejected() {
        let config = Config {
            level: "nebula_action=loudest".to_string(),
            ..Config::default()
        };
        let err = LoggerBuilder::from_config(config).build().unwrap_err();
        assert!(matches!(err, LogError::Filter(_)));
    }

    #[test]
    fn second_init_is_a_noop() {
        let _first = LoggerBuilder::from_config(Config::default()).build();
        let second = LoggerBuilder::from_config(Config::production())
            .build()
            .unwrap();
        assert!(!second.is_active());
    }
}
