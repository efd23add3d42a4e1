//! API transport contract.
//!
//! Callbacks reach the remote API through an [`ApiTransport`]: a single
//! `method × params → response` call shape. How the call travels (HTTP,
//! a test double, ...) is up to the implementation; the `vkbot-transport`
//! crate provides the HTTP one.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// Parameters of one API call.
pub type ApiParams = Map<String, Value>;

/// A type-erased transport that can be shared between callbacks.
pub type BoxedTransport = Arc<dyn ApiTransport>;

/// Remote-call capability used by application code inside callbacks.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Calls `method` (e.g. `"messages.send"`) and returns the unwrapped
    /// `response` value.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the call fails or the API answers with an
    /// error object.
    async fn call(&self, _method: &str, _params: ApiParams) -> ApiResult<Value> {
        Err(ApiError::NotSupported)
    }
}

/// [`ApiTransport`] for setups that cannot issue API calls.
///
/// Any call returns [`ApiError::NotSupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTransport;

#[async_trait]
impl ApiTransport for DisabledTransport {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_transport_rejects_calls() {
        let transport: BoxedTransport = Arc::new(DisabledTransport);
        let result = transport.call("users.get", ApiParams::new()).await;
        assert!(matches!(result, Err(ApiError::NotSupported)));
    }
}
