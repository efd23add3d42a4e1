//! Configuration for the vkbot runtime.
//!
//! TOML files, `VKBOT_*` environment variables and programmatic overrides
//! are layered with figment into a [`BotConfig`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    ApiConfig, BotConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;
