//! Typed API responses.
//!
//! Every object type keeps the fields it does not name in `extra`, so newer
//! API versions never break deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The plain `1` most mutating methods answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OkResponse(pub i64);

impl OkResponse {
    /// Returns `true` if the API reported success.
    pub fn is_ok(&self) -> bool {
        self.0 == 1
    }
}

/// A counted list, optionally with the profiles and groups it mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    /// Total number of items, which may exceed `items.len()`.
    #[serde(default)]
    pub count: i64,
    /// The returned page of items.
    pub items: Vec<T>,
    /// User profiles, present for extended requests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<Value>,
    /// Communities, present for extended requests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Value>,
    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub date: Option<i64>,
    /// `photo` or `video`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A block of the stories feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Block type, e.g. `stories` or `community_grouped_stories`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Upload target for a new story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadServer {
    pub upload_url: String,
    /// Users the story will be visible to.
    #[serde(default)]
    pub user_ids: Vec<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One metric of [`StoryStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    /// `on`, `off` or `hidden`.
    pub state: String,
    #[serde(default)]
    pub count: Option<i64>,
}

/// Story statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryStats {
    pub views: Option<StatValue>,
    pub replies: Option<StatValue>,
    pub answer: Option<StatValue>,
    pub shares: Option<StatValue>,
    pub subscribers: Option<StatValue>,
    pub bans: Option<StatValue>,
    pub open_link: Option<StatValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stories created from upload results.
pub type SavedStories = ItemsResponse<Story>;

/// Stories feed pages (`get`, `getReplies`, `search`).
pub type StoriesFeed = ItemsResponse<FeedItem>;

/// Ids of owners hidden from the stories feed.
pub type BannedOwners = ItemsResponse<i64>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_are_kept() {
        let story: Story = serde_json::from_value(json!({
            "id": 1,
            "owner_id": -5,
            "type": "photo",
            "can_see": 1
        }))
        .unwrap();
        assert_eq!(story.kind.as_deref(), Some("photo"));
        assert_eq!(story.extra.get("can_see"), Some(&json!(1)));
    }

    #[test]
    fn test_items_response_defaults() {
        let banned: BannedOwners = serde_json::from_value(json!({"count": 2, "items": [1, 2]})).unwrap();
        assert_eq!(banned.items, vec![1, 2]);
        assert!(banned.profiles.is_empty());

        let extended: BannedOwners = serde_json::from_value(json!({
            "count": 1,
            "items": [7],
            "profiles": [{"id": 7}],
            "groups": []
        }))
        .unwrap();
        assert_eq!(extended.profiles.len(), 1);
    }

    #[test]
    fn test_ok_response() {
        let ok: OkResponse = serde_json::from_value(json!(1)).unwrap();
        assert!(ok.is_ok());
        assert!(!OkResponse(0).is_ok());
    }
}
