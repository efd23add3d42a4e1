//! Method categories.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;
use vkbot_core::{ApiResult, BoxedTransport};

use crate::params::Params;

/// A group of API methods sharing a name prefix, such as `stories`.
#[async_trait]
pub trait Category: Send + Sync {
    /// The method prefix.
    const NAME: &'static str;

    /// Returns the transport calls go through.
    fn transport(&self) -> &BoxedTransport;

    /// Calls `<NAME>.<method>` and returns the raw response.
    async fn api_request(&self, method: &str, params: Params) -> ApiResult<Value> {
        let full_name = format!("{}.{}", Self::NAME, method);
        let params = params.into_inner();
        trace!(method = %full_name, param_count = params.len(), "Calling API method");
        self.transport().call(&full_name, params).await
    }

    /// Calls `<NAME>.<method>` and deserializes the response.
    async fn typed<T>(&self, method: &str, params: Params) -> ApiResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let raw = self.api_request(method, params).await?;
        Ok(serde_json::from_value(raw)?)
    }
}
