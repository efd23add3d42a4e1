//! # vkbot API
//!
//! Typed wrappers over the VK API, built on an [`ApiTransport`].
//!
//! ```rust,ignore
//! let api = Api::new(transport);
//! let feed = api.stories().get(None, false, &[]).await?;
//! api.messages().send(SendMessage::new(peer_id, "hi")).await?;
//! ```
//!
//! Every category also offers `raw(method, params)` returning the response
//! [`Value`](serde_json::Value) untouched.

pub mod category;
pub mod methods;
pub mod params;
pub mod types;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use serde_json::Value;
use vkbot_core::{ApiResult, ApiTransport, BoxedTransport};

pub use category::Category;
pub use methods::{Interaction, Messages, SearchQuery, SendMessage, Stories, UploadOptions};
pub use params::{IntoParam, Params};
pub use types::{
    BannedOwners, FeedItem, ItemsResponse, OkResponse, SavedStories, StatValue, StoriesFeed,
    Story, StoryStats, UploadServer,
};

/// Entry point to the API categories.
///
/// Cheap to clone; all clones share the transport.
#[derive(Clone)]
pub struct Api {
    transport: BoxedTransport,
}

impl Api {
    /// Creates an API over a transport.
    pub fn new<T: ApiTransport + 'static>(transport: T) -> Self {
        Self::from_boxed(Arc::new(transport))
    }

    /// Creates an API over an already shared transport.
    pub fn from_boxed(transport: BoxedTransport) -> Self {
        Self { transport }
    }

    /// Returns the shared transport.
    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }

    /// The `stories.*` methods.
    pub fn stories(&self) -> Stories {
        Stories::new(Arc::clone(&self.transport))
    }

    /// The `messages.*` methods.
    pub fn messages(&self) -> Messages {
        Messages::new(Arc::clone(&self.transport))
    }

    /// Calls a fully qualified method, e.g. `"users.get"`.
    pub async fn call(&self, method: &str, params: Params) -> ApiResult<Value> {
        self.transport.call(method, params.into_inner()).await
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use serde_json::json;
    use vkbot_core::{ApiError, DisabledTransport};

    #[tokio::test]
    async fn test_categories_share_transport() {
        let transport = RecordingTransport::new(json!(1));
        let api = Api::from_boxed(transport.clone());

        api.stories().hide_reply(1, 2).await.unwrap();
        assert_eq!(transport.last_call().0, "stories.hideReply");

        api.call("users.get", Params::new().set("user_ids", "1"))
            .await
            .unwrap();
        assert_eq!(transport.last_call().0, "users.get");
    }

    #[tokio::test]
    async fn test_disabled_transport_errors() {
        let api = Api::new(DisabledTransport);
        let err = api.messages().send(SendMessage::new(1, "x")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotSupported));
    }
}
