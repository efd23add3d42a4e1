//! # vkbot Runtime
//!
//! Everything around the dispatch core that a running bot needs:
//!
//! - [`config`]: layered configuration (TOML files, `VKBOT_*` environment, overrides)
//! - [`logging`]: `tracing-subscriber` setup driven by the `[logging]` section
//! - [`BotRuntime`]: runs a [`Dispatcher`](vkbot_dispatch::Dispatcher) over an
//!   event stream, one task per event, with an optional per-event timeout
//!
//! ```rust,ignore
//! use vkbot_runtime::BotRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = BotRuntime::builder().build()?;
//!     runtime.register_router(router);
//!     runtime.run_until_signal(events).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{BotConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{BotRuntime, RuntimeBuilder, RuntimeStats};

pub use tracing;

/// Logging macros for bot code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
