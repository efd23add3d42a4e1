//! HTTP transport configuration.

use std::time::Duration;

use vkbot_core::{TransportError, TransportResult};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.vk.com";

/// Default API version sent as `v`.
pub const DEFAULT_API_VERSION: &str = "5.199";

/// Settings for [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Endpoint root; methods are called at `{base_url}/method/{name}`.
    pub base_url: String,
    /// Community or user access token.
    pub access_token: String,
    /// API version.
    pub api_version: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpTransportConfig {
    /// Creates a config with default endpoint, version and a 30 second timeout.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Overrides the endpoint root.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Overrides the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the URL for a fully qualified method name.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/method/{}", self.base_url.trim_end_matches('/'), method)
    }

    /// Checks that the config can be used for requests.
    pub fn validate(&self) -> TransportResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(TransportError::InvalidConfig(
                "access token is empty".into(),
            ));
        }
        if self.api_version.trim().is_empty() {
            return Err(TransportError::InvalidConfig("API version is empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(TransportError::InvalidConfig("timeout must be positive".into()));
        }
        Ok(())
    }
}
