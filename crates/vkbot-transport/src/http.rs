//! HTTP API transport.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use vkbot_core::{ApiParams, ApiResult, ApiTransport, TransportError, TransportResult};

use crate::config::HttpTransportConfig;
use crate::wire::{decode_response, encode_form};

/// [`ApiTransport`] that POSTs form-encoded calls to the API endpoint.
///
/// Each call adds `access_token` and `v` to the parameters, sends them to
/// `{base_url}/method/{method}` and unwraps the `response` field.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Creates a transport from a validated config.
    pub fn new(config: HttpTransportConfig) -> TransportResult<Self> {
        config.validate()?;
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Returns the config the transport was built with.
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    async fn post(&self, url: &str, form: &[(String, String)]) -> TransportResult<Value> {
        let resp = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn call(&self, method: &str, params: ApiParams) -> ApiResult<Value> {
        let url = self.config.method_url(method);

        let mut form = encode_form(params);
        form.push(("access_token".into(), self.config.access_token.clone()));
        form.push(("v".into(), self.config.api_version.clone()));

        debug!(method = %method, "Sending API request");
        let body = self.post(&url, &form).await?;

        decode_response(body).inspect_err(|e| {
            warn!(method = %method, error = %e, "API call failed");
        })
    }
}
