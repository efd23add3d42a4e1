use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use vkbot_core::{ApiParams, ApiResult, ApiTransport};

/// Records every call and answers with a fixed response.
pub(crate) struct RecordingTransport {
    response: Value,
    calls: Mutex<Vec<(String, ApiParams)>>,
}

impl RecordingTransport {
    pub(crate) fn new(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn last_call(&self) -> (String, ApiParams) {
        self.calls.lock().last().cloned().expect("no call recorded")
    }
}

#[async_trait]
impl ApiTransport for RecordingTransport {
    async fn call(&self, method: &str, params: ApiParams) -> ApiResult<Value> {
        self.calls.lock().push((method.to_owned(), params));
        Ok(self.response.clone())
    }
}
