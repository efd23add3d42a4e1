//! The `messages.*` methods used by bot callbacks.

use serde_json::Value;
use vkbot_core::{ApiResult, BoxedTransport};

use crate::category::Category;
use crate::params::Params;

/// An outgoing message for `messages.send`.
#[derive(Debug, Clone)]
pub struct SendMessage {
    peer_id: i64,
    text: String,
    random_id: i64,
    keyboard: Option<String>,
    payload: Option<String>,
    reply_to: Option<i64>,
}

impl SendMessage {
    /// Creates a text message to `peer_id`.
    ///
    /// `random_id` defaults to `0`, which disables the API's duplicate check.
    pub fn new(peer_id: i64, text: impl Into<String>) -> Self {
        Self {
            peer_id,
            text: text.into(),
            random_id: 0,
            keyboard: None,
            payload: None,
            reply_to: None,
        }
    }

    /// Sets the deduplication id.
    pub fn random_id(mut self, random_id: i64) -> Self {
        self.random_id = random_id;
        self
    }

    /// Attaches a keyboard given as JSON.
    pub fn keyboard(mut self, keyboard: &Value) -> Self {
        self.keyboard = Some(keyboard.to_string());
        self
    }

    /// Attaches a payload given as JSON.
    pub fn payload(mut self, payload: &Value) -> Self {
        self.payload = Some(payload.to_string());
        self
    }

    /// Replies to the message with the given id.
    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    fn into_params(self) -> Params {
        Params::new()
            .set("peer_id", self.peer_id)
            .set("message", self.text)
            .set("random_id", self.random_id)
            .set("keyboard", self.keyboard)
            .set("payload", self.payload)
            .set("reply_to", self.reply_to)
    }
}

/// The `messages` category.
#[derive(Clone)]
pub struct Messages {
    transport: BoxedTransport,
}

impl Category for Messages {
    const NAME: &'static str = "messages";

    fn transport(&self) -> &BoxedTransport {
        &self.transport
    }
}

impl Messages {
    /// Creates the category over a transport.
    pub fn new(transport: BoxedTransport) -> Self {
        Self { transport }
    }

    /// Sends a message and returns its id.
    pub async fn send(&self, message: SendMessage) -> ApiResult<i64> {
        self.typed("send", message.into_params()).await
    }

    /// Calls any `messages.*` method and returns the response untouched.
    pub async fn raw(&self, method: &str, params: Params) -> ApiResult<Value> {
        self.api_request(method, params).await
    }
}
