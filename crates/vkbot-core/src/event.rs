//! Event model for the vkbot framework.
//!
//! This module provides the value that flows through dispatch:
//!
//! - [`EventKind`] - The event-kind tag (`message_new`, `message_event`, ...)
//! - [`BotEvent`] - An immutable, cheaply clonable inbound event
//!
//! Events arrive from an ingestion component (Bots Long Poll, Callback API)
//! as a JSON envelope:
//!
//! ```json
//! {"type": "message_new", "object": {"message": {"text": "hi"}}, "group_id": 1, "event_id": "..."}
//! ```
//!
//! The envelope is decoded once with [`BotEvent::from_json`]; filters and
//! callbacks only ever see read-only accessors.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{EventError, EventResult};

// ============================================================================
// Event Kind
// ============================================================================

/// The kind tag of an inbound event.
///
/// Known community event types get their own variant; anything else is kept
/// verbatim in [`EventKind::Other`] so that unknown events can still be routed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new incoming message.
    MessageNew,
    /// A reply sent by the community.
    MessageReply,
    /// A message was edited.
    MessageEdit,
    /// A callback button was pressed.
    MessageEvent,
    /// The user allowed messages from the community.
    MessageAllow,
    /// The user denied messages from the community.
    MessageDeny,
    /// A user joined the community.
    GroupJoin,
    /// A user left the community.
    GroupLeave,
    /// A new wall post.
    WallPostNew,
    /// Callback API server confirmation request.
    Confirmation,
    /// Any other event type.
    Other(String),
}

impl EventKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::MessageNew => "message_new",
            Self::MessageReply => "message_reply",
            Self::MessageEdit => "message_edit",
            Self::MessageEvent => "message_event",
            Self::MessageAllow => "message_allow",
            Self::MessageDeny => "message_deny",
            Self::GroupJoin => "group_join",
            Self::GroupLeave => "group_leave",
            Self::WallPostNew => "wall_post_new",
            Self::Confirmation => "confirmation",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for the message family of events.
    pub fn is_message(&self) -> bool {
        matches!(
            self,
            Self::MessageNew | Self::MessageReply | Self::MessageEdit
        )
    }
}

impl FromStr for EventKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "message_new" => Self::MessageNew,
            "message_reply" => Self::MessageReply,
            "message_edit" => Self::MessageEdit,
            "message_event" => Self::MessageEvent,
            "message_allow" => Self::MessageAllow,
            "message_deny" => Self::MessageDeny,
            "group_join" => Self::GroupJoin,
            "group_leave" => Self::GroupLeave,
            "wall_post_new" => Self::WallPostNew,
            "confirmation" => Self::Confirmation,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Bot Event
// ============================================================================

#[derive(Clone)]
struct EventInner {
    kind: EventKind,
    object: Value,
    group_id: Option<i64>,
    event_id: Option<String>,
}

/// One inbound occurrence to be dispatched.
///
/// `BotEvent` wraps its data in an `Arc`, so cloning is cheap and every task
/// processing the event sees the same immutable value. There are no mutating
/// accessors; the `with_*` methods are only meant for construction.
#[derive(Clone)]
pub struct BotEvent {
    inner: Arc<EventInner>,
}

impl BotEvent {
    /// Creates an event from a kind and its raw `object` payload.
    pub fn new(kind: impl Into<EventKind>, object: Value) -> Self {
        Self {
            inner: Arc::new(EventInner {
                kind: kind.into(),
                object,
                group_id: None,
                event_id: None,
            }),
        }
    }

    /// Sets the community id the event belongs to.
    pub fn with_group_id(mut self, group_id: i64) -> Self {
        Arc::make_mut(&mut self.inner).group_id = Some(group_id);
        self
    }

    /// Sets the event id.
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).event_id = Some(event_id.into());
        self
    }

    /// Decodes an event from a JSON envelope string.
    pub fn from_json(raw: &str) -> EventResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Decodes an event from an already parsed JSON envelope.
    ///
    /// A missing `object` is treated as an empty payload; a missing `type` is an error.
    pub fn from_value(value: Value) -> EventResult<Self> {
        let Value::Object(mut envelope) = value else {
            return Err(EventError::NotAnObject);
        };

        let kind = envelope
            .get("type")
            .and_then(Value::as_str)
            .map(EventKind::from)
            .ok_or(EventError::MissingType)?;
        let object = envelope.remove("object").unwrap_or(Value::Null);
        let group_id = envelope.get("group_id").and_then(Value::as_i64);
        let event_id = envelope
            .get("event_id")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            inner: Arc::new(EventInner {
                kind,
                object,
                group_id,
                event_id,
            }),
        })
    }

    /// Returns the event kind.
    pub fn kind(&self) -> &EventKind {
        &self.inner.kind
    }

    /// Returns the raw `object` payload.
    pub fn object(&self) -> &Value {
        &self.inner.object
    }

    /// Returns the community id, if the envelope carried one.
    pub fn group_id(&self) -> Option<i64> {
        self.inner.group_id
    }

    /// Returns the event id, if the envelope carried one.
    pub fn event_id(&self) -> Option<&str> {
        self.inner.event_id.as_deref()
    }

    /// Looks a field up in `object.message`, falling back to `object` itself.
    ///
    /// Message events nest the message under `message`; older API versions
    /// and callback events put the fields on the object directly.
    pub fn message_field(&self, key: &str) -> Option<&Value> {
        let object = &self.inner.object;
        object
            .get("message")
            .and_then(|m| m.get(key))
            .or_else(|| object.get(key))
    }

    /// Returns the message text, if any.
    pub fn text(&self) -> Option<&str> {
        self.message_field("text").and_then(Value::as_str)
    }

    /// Returns the button payload, if any.
    ///
    /// Message payloads are sent as JSON-encoded strings; they are decoded here.
    /// A string that is not valid JSON is returned as a JSON string.
    pub fn payload(&self) -> Option<Value> {
        match self.message_field("payload")? {
            Value::String(s) => {
                Some(serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())))
            }
            other => Some(other.clone()),
        }
    }

    /// Returns the peer (conversation) id.
    pub fn peer_id(&self) -> Option<i64> {
        self.message_field("peer_id").and_then(Value::as_i64)
    }

    /// Returns the sender id (`from_id`, or `user_id` for non-message events).
    pub fn from_id(&self) -> Option<i64> {
        self.message_field("from_id")
            .or_else(|| self.message_field("user_id"))
            .and_then(Value::as_i64)
    }
}

impl fmt::Debug for BotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotEvent")
            .field("kind", &self.inner.kind)
            .field("group_id", &self.inner.group_id)
            .field("event_id", &self.inner.event_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trips_known_and_unknown_names() {
        assert_eq!(EventKind::from("message_new"), EventKind::MessageNew);
        assert_eq!(EventKind::from("message_event").as_str(), "message_event");

        let other = EventKind::from("like_add");
        assert_eq!(other, EventKind::Other("like_add".into()));
        assert_eq!(other.to_string(), "like_add");
    }

    #[test]
    fn test_from_json_decodes_envelope() {
        let event = BotEvent::from_json(
            r#"{"type":"message_new","object":{"message":{"text":"hi","peer_id":2000000001,"from_id":42}},"group_id":7,"event_id":"abc"}"#,
        )
        .unwrap();

        assert_eq!(event.kind(), &EventKind::MessageNew);
        assert_eq!(event.text(), Some("hi"));
        assert_eq!(event.peer_id(), Some(2_000_000_001));
        assert_eq!(event.from_id(), Some(42));
        assert_eq!(event.group_id(), Some(7));
        assert_eq!(event.event_id(), Some("abc"));
    }

    #[test]
    fn test_from_json_rejects_missing_type() {
        assert!(matches!(
            BotEvent::from_json(r#"{"object":{}}"#),
            Err(EventError::MissingType)
        ));
        assert!(matches!(
            BotEvent::from_json("[1,2]"),
            Err(EventError::NotAnObject)
        ));
        assert!(matches!(
            BotEvent::from_json("{"),
            Err(EventError::Malformed(_))
        ));
    }

    #[test]
    fn test_accessors_degrade_on_malformed_payload() {
        let event = BotEvent::new("message_new", json!({"message": 5}));
        assert_eq!(event.text(), None);
        assert_eq!(event.payload(), None);
        assert_eq!(event.peer_id(), None);

        let event = BotEvent::new("group_join", Value::Null);
        assert_eq!(event.from_id(), None);
    }

    #[test]
    fn test_payload_decodes_json_strings() {
        let event = BotEvent::new(
            EventKind::MessageNew,
            json!({"message": {"payload": "{\"command\":\"start\"}"}}),
        );
        assert_eq!(event.payload(), Some(json!({"command": "start"})));

        let callback = BotEvent::new(
            EventKind::MessageEvent,
            json!({"user_id": 1, "payload": {"button": 2}}),
        );
        assert_eq!(callback.payload(), Some(json!({"button": 2})));
        assert_eq!(callback.from_id(), Some(1));

        let plain = BotEvent::new(EventKind::MessageNew, json!({"payload": "not json"}));
        assert_eq!(plain.payload(), Some(json!("not json")));
    }

    #[test]
    fn test_with_builders_do_not_affect_clones() {
        let original = BotEvent::new("message_new", json!({}));
        let copy = original.clone().with_group_id(3);
        assert_eq!(original.group_id(), None);
        assert_eq!(copy.group_id(), Some(3));
    }
}
