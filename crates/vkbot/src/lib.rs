//! # vkbot
//!
//! An event routing framework for VK community bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌──────────────────────┐
//! │  BotRuntime │────▶│ Dispatcher │────▶│ Router "messages"    │──▶ Handler ──▶ Api
//! │  (events)   │     │            │────▶│ Router "callbacks"   │──▶ Handler ──▶ Api
//! └─────────────┘     └────────────┘     └──────────────────────┘
//! ```
//!
//! - **Runtime**: configuration, logging, one task per inbound event
//! - **Dispatcher**: tries routers in order until one finds a handler
//! - **Routers**: a filter gate in front of an ordered list of handlers
//! - **Handlers**: filters plus an async callback; the first whose filters pass wins
//! - **Api**: typed method wrappers over an HTTP transport
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vkbot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = BotRuntime::builder().build()?;
//!     let api = Api::new(runtime.http_transport()?);
//!
//!     let mut router = DefaultRouter::named("messages");
//!     router.add_filter(EventTypeFilter::new(EventKind::MessageNew));
//!     router.register_handler(filters![CommandsFilter::new(["ping"])], move |event| {
//!         let api = api.clone();
//!         async move {
//!             let peer = event.peer_id().unwrap_or_default();
//!             api.messages().send(SendMessage::new(peer, "pong")).await?;
//!             Ok(())
//!         }
//!     });
//!
//!     runtime.register_router(router);
//!     runtime.run_until_signal(events).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `http-client` *(default)*: [`HttpTransport`](transport::HttpTransport)
//! - `json-log`: JSON log output

pub use vkbot_api as api;
pub use vkbot_core as core;
pub use vkbot_dispatch as dispatch;
pub use vkbot_runtime as runtime;
pub use vkbot_transport as transport;

/// Commonly used types for writing a bot.
pub mod prelude {
    // Runtime
    pub use vkbot_runtime::{BotConfig, BotRuntime, RuntimeStats};

    // Events
    pub use vkbot_core::{BotEvent, EventKind};

    // Dispatch
    pub use vkbot_dispatch::prelude::*;
    pub use vkbot_dispatch::{BoxError, HandlerRegistrar};

    // API
    pub use vkbot_api::{Api, Params, SendMessage};
    pub use vkbot_core::{ApiError, ApiResult};

    #[cfg(feature = "http-client")]
    pub use vkbot_transport::HttpTransport;

    // Logging
    pub use vkbot_runtime::prelude::*;
}
