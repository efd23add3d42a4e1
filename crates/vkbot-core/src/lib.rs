//! # vkbot Core
//!
//! Shared building blocks for the vkbot framework:
//!
//! - **Events**: the immutable [`BotEvent`] value and its [`EventKind`] tag
//! - **API transport**: the [`ApiTransport`] contract callbacks use to call the API
//! - **Errors**: [`EventError`], [`TransportError`] and [`ApiError`]
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌──────────┐     ┌──────────┐
//! │  Ingestion  │────▶│ Dispatcher │────▶│  Router  │────▶│ Handler  │──▶ ApiTransport
//! │ (long poll) │     │            │────▶│  Router  │     │ callback │
//! └─────────────┘     └────────────┘     └──────────┘     └──────────┘
//! ```

pub mod api;
pub mod error;
pub mod event;

pub use api::{ApiParams, ApiTransport, BoxedTransport, DisabledTransport};
pub use error::{
    ApiError, ApiResult, EventError, EventResult, TransportError, TransportResult,
};
pub use event::{BotEvent, EventKind};
