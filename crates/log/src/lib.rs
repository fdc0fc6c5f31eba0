//! # Nebula Log
//!
//! Zero-config `tracing` setup for processes that host Nebula integrations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! fn main() -> Result<(), nebula_log::LogError> {
//!     let _guard = nebula_log::auto_init()?;
//!     tracing::info!(port = 8080, "host starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DEVELOPMENT_FILTER, DisplayConfig, Format};

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LogError {
    /// Filter directive could not be parsed
    #[error("Invalid filter: {0}")]
    Filter(String),

    /// Subscriber could not be installed
    #[error("Init error: {0}")]
    Init(String),
}

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Pick a configuration from the environment and build type.
///
/// `NEBULA_LOG` or `RUST_LOG` set → [`Config::from_env`]; otherwise
/// development settings in debug builds and production settings in
/// release builds.
pub fn auto_init() -> LogResult<LoggerGuard> {
    if std::env::var("NEBULA_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}
