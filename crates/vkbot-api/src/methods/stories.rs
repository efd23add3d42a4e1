//! The `stories.*` methods.

use serde_json::Value;
use vkbot_core::{ApiResult, BoxedTransport};

use crate::category::Category;
use crate::params::Params;
use crate::types::{
    BannedOwners, ItemsResponse, OkResponse, SavedStories, StoriesFeed, Story, StoryStats,
    UploadServer,
};

/// Options shared by `getPhotoUploadServer` and `getVideoUploadServer`.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Add the story to friends' feeds.
    pub add_to_news: Option<bool>,
    /// Users who can see the story.
    pub user_ids: Vec<i64>,
    /// `{owner_id}_{story_id}` of the story to reply to.
    pub reply_to_story: Option<String>,
    /// Link text, community stories only.
    pub link_text: Option<String>,
    pub link_url: Option<String>,
    /// Community to upload the story to.
    pub group_id: Option<i64>,
    /// JSON description of clickable stickers.
    pub clickable_stickers: Option<String>,
}

impl UploadOptions {
    fn into_params(self) -> Params {
        Params::new()
            .set("add_to_news", self.add_to_news)
            .set("user_ids", self.user_ids)
            .set("reply_to_story", self.reply_to_story)
            .set("link_text", self.link_text)
            .set("link_url", self.link_url)
            .set("group_id", self.group_id)
            .set("clickable_stickers", self.clickable_stickers)
    }
}

/// Query for `stories.search`.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub place_id: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Search radius around the coordinates.
    pub radius: Option<i64>,
    pub mentioned_id: Option<i64>,
    pub count: Option<u32>,
    pub extended: bool,
    pub fields: Vec<String>,
}

/// A reaction sent with `stories.sendInteraction`.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub access_key: String,
    pub message: Option<String>,
    pub is_broadcast: Option<bool>,
    pub is_anonymous: Option<bool>,
    pub unseen_marker: Option<bool>,
}

impl Interaction {
    /// Creates an interaction for the story identified by `access_key`.
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            ..Self::default()
        }
    }

    /// Attaches a text message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// The `stories` category.
#[derive(Clone)]
pub struct Stories {
    transport: BoxedTransport,
}

impl Category for Stories {
    const NAME: &'static str = "stories";

    fn transport(&self) -> &BoxedTransport {
        &self.transport
    }
}

impl Stories {
    /// Creates the category over a transport.
    pub fn new(transport: BoxedTransport) -> Self {
        Self { transport }
    }

    /// Calls any `stories.*` method and returns the response untouched.
    pub async fn raw(&self, method: &str, params: Params) -> ApiResult<Value> {
        self.api_request(method, params).await
    }

    /// Hides the given sources from the stories feed.
    pub async fn ban_owner(&self, owners_ids: &[i64]) -> ApiResult<OkResponse> {
        self.typed("banOwner", Params::new().set("owners_ids", owners_ids))
            .await
    }

    /// Deletes a story, either by `owner_id` + `story_id` or by a list of
    /// `{owner_id}_{story_id}` ids.
    pub async fn delete(
        &self,
        owner_id: Option<i64>,
        story_id: Option<i64>,
        stories: &[String],
    ) -> ApiResult<OkResponse> {
        let params = Params::new()
            .set("owner_id", owner_id)
            .set("story_id", story_id)
            .set("stories", stories);
        self.typed("delete", params).await
    }

    /// Returns the stories feed, or one owner's stories.
    pub async fn get(
        &self,
        owner_id: Option<i64>,
        extended: bool,
        fields: &[String],
    ) -> ApiResult<StoriesFeed> {
        let params = Params::new()
            .set("owner_id", owner_id)
            .flag("extended", extended)
            .set("fields", fields);
        self.typed("get", params).await
    }

    /// Returns ids of owners hidden from the feed.
    pub async fn get_banned(&self) -> ApiResult<BannedOwners> {
        self.typed("getBanned", Params::new()).await
    }

    /// Like [`get_banned`](Self::get_banned), also filling `profiles` and
    /// `groups` with the requested `fields`.
    pub async fn get_banned_extended(&self, fields: &[String]) -> ApiResult<BannedOwners> {
        let params = Params::new()
            .flag("extended", true)
            .set("fields", fields);
        self.typed("getBanned", params).await
    }

    /// Returns stories by their `{owner_id}_{story_id}` ids.
    pub async fn get_by_id(
        &self,
        stories: &[String],
        extended: bool,
        fields: &[String],
    ) -> ApiResult<ItemsResponse<Story>> {
        let params = Params::new()
            .set("stories", stories)
            .flag("extended", extended)
            .set("fields", fields);
        self.typed("getById", params).await
    }

    /// Returns an upload URL for a photo story.
    pub async fn get_photo_upload_server(&self, options: UploadOptions) -> ApiResult<UploadServer> {
        self.typed("getPhotoUploadServer", options.into_params())
            .await
    }

    /// Returns replies to a story.
    pub async fn get_replies(
        &self,
        owner_id: i64,
        story_id: i64,
        access_key: Option<&str>,
        extended: bool,
        fields: &[String],
    ) -> ApiResult<StoriesFeed> {
        let params = Params::new()
            .set("owner_id", owner_id)
            .set("story_id", story_id)
            .set("access_key", access_key)
            .flag("extended", extended)
            .set("fields", fields);
        self.typed("getReplies", params).await
    }

    /// Returns statistics of a story.
    pub async fn get_stats(&self, owner_id: i64, story_id: i64) -> ApiResult<StoryStats> {
        let params = Params::new()
            .set("owner_id", owner_id)
            .set("story_id", story_id);
        self.typed("getStats", params).await
    }

    /// Returns an upload URL for a video story.
    pub async fn get_video_upload_server(&self, options: UploadOptions) -> ApiResult<UploadServer> {
        self.typed("getVideoUploadServer", options.into_params())
            .await
    }

    /// Returns the users who viewed a story.
    ///
    /// Items are user ids, or viewer objects when `extended` is set.
    pub async fn get_viewers(
        &self,
        owner_id: i64,
        story_id: i64,
        count: Option<u32>,
        offset: Option<u32>,
        extended: bool,
    ) -> ApiResult<ItemsResponse<Value>> {
        let params = Params::new()
            .set("owner_id", owner_id)
            .set("story_id", story_id)
            .set("count", count)
            .set("offset", offset)
            .flag("extended", extended);
        self.typed("getViewers", params).await
    }

    /// Hides all replies from the last 24 hours by one user.
    pub async fn hide_all_replies(
        &self,
        owner_id: i64,
        group_id: Option<i64>,
    ) -> ApiResult<OkResponse> {
        let params = Params::new()
            .set("owner_id", owner_id)
            .set("group_id", group_id);
        self.typed("hideAllReplies", params).await
    }

    /// Hides one reply to the current user's story.
    pub async fn hide_reply(&self, owner_id: i64, story_id: i64) -> ApiResult<OkResponse> {
        let params = Params::new()
            .set("owner_id", owner_id)
            .set("story_id", story_id);
        self.typed("hideReply", params).await
    }

    /// Publishes uploaded stories.
    pub async fn save(&self, upload_results: &[String]) -> ApiResult<SavedStories> {
        self.typed("save", Params::new().set("upload_results", upload_results))
            .await
    }

    /// Searches public stories.
    pub async fn search(&self, query: SearchQuery) -> ApiResult<StoriesFeed> {
        let params = Params::new()
            .set("q", query.q)
            .set("place_id", query.place_id)
            .set("latitude", query.latitude)
            .set("longitude", query.longitude)
            .set("radius", query.radius)
            .set("mentioned_id", query.mentioned_id)
            .set("count", query.count)
            .flag("extended", query.extended)
            .set("fields", query.fields);
        self.typed("search", params).await
    }

    /// Sends a reaction or a message to a story's author.
    pub async fn send_interaction(&self, interaction: Interaction) -> ApiResult<OkResponse> {
        let params = Params::new()
            .set("access_key", interaction.access_key)
            .set("message", interaction.message)
            .set("is_broadcast", interaction.is_broadcast)
            .set("is_anonymous", interaction.is_anonymous)
            .set("unseen_marker", interaction.unseen_marker);
        self.typed("sendInteraction", params).await
    }

    /// Shows stories from previously hidden sources again.
    pub async fn unban_owner(&self, owners_ids: &[i64]) -> ApiResult<OkResponse> {
        self.typed("unbanOwner", Params::new().set("owners_ids", owners_ids))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use serde_json::json;
    use vkbot_core::ApiError;

    #[tokio::test]
    async fn test_ban_owner_joins_ids() {
        let transport = RecordingTransport::new(json!(1));
        let stories = Stories::new(transport.clone());

        let result = stories.ban_owner(&[1, -20]).await.unwrap();
        assert!(result.is_ok());

        let (method, params) = transport.last_call();
        assert_eq!(method, "stories.banOwner");
        assert_eq!(params.get("owners_ids"), Some(&json!("1,-20")));
    }

    #[tokio::test]
    async fn test_get_banned_variants_differ_only_in_request() {
        let transport = RecordingTransport::new(json!({"count": 1, "items": [3]}));
        let stories = Stories::new(transport.clone());

        let plain = stories.get_banned().await.unwrap();
        assert_eq!(plain.items, vec![3]);
        let (_, params) = transport.last_call();
        assert!(params.get("extended").is_none());

        stories
            .get_banned_extended(&["photo_50".to_string()])
            .await
            .unwrap();
        let (method, params) = transport.last_call();
        assert_eq!(method, "stories.getBanned");
        assert_eq!(params.get("extended"), Some(&json!(1)));
        assert_eq!(params.get("fields"), Some(&json!("photo_50")));
    }

    #[tokio::test]
    async fn test_upload_options_skip_unset_fields() {
        let transport = RecordingTransport::new(json!({"upload_url": "https://upload", "user_ids": []}));
        let stories = Stories::new(transport.clone());

        let server = stories
            .get_video_upload_server(UploadOptions {
                add_to_news: Some(true),
                group_id: Some(7),
                ..UploadOptions::default()
            })
            .await
            .unwrap();
        assert_eq!(server.upload_url, "https://upload");

        let (method, params) = transport.last_call();
        assert_eq!(method, "stories.getVideoUploadServer");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("add_to_news"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_typed_response_mismatch_is_serialization_error() {
        let transport = RecordingTransport::new(json!("not an object"));
        let stories = Stories::new(transport.clone());
        let err = stories.get_stats(1, 2).await.unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_raw_returns_response_untouched() {
        let response = json!({"count": 0, "items": [], "next_from": "x"});
        let transport = RecordingTransport::new(response.clone());
        let stories = Stories::new(transport.clone());

        let raw = stories
            .raw("search", Params::new().set("q", "cats"))
            .await
            .unwrap();
        assert_eq!(raw, response);

        let typed = stories
            .search(SearchQuery {
                q: Some("cats".into()),
                ..SearchQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(typed.extra.get("next_from"), Some(&json!("x")));
    }

    #[tokio::test]
    async fn test_send_interaction() {
        let transport = RecordingTransport::new(json!(1));
        let stories = Stories::new(transport.clone());
        stories
            .send_interaction(Interaction::new("key").message("nice"))
            .await
            .unwrap();

        let (method, params) = transport.last_call();
        assert_eq!(method, "stories.sendInteraction");
        assert_eq!(params.get("access_key"), Some(&json!("key")));
        assert_eq!(params.get("message"), Some(&json!("nice")));
        assert!(params.get("is_anonymous").is_none());
    }
}
