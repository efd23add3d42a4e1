//! # vkbot Transport
//!
//! Network transports implementing [`ApiTransport`](vkbot_core::ApiTransport).
//!
//! # Features
//!
//! - `http-client`: [`HttpTransport`], form-encoded POST over `reqwest`
//! - `full`: everything above

pub mod config;
pub mod wire;

#[cfg(feature = "http-client")]
pub mod http;

pub use config::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, HttpTransportConfig};

#[cfg(feature = "http-client")]
pub use http::HttpTransport;
