//! VK wire format helpers.
//!
//! Requests are flat form fields; responses are either
//! `{"response": ...}` or `{"error": {"error_code": ..., "error_msg": ...}}`.

use serde_json::Value;
use vkbot_core::{ApiError, ApiParams, ApiResult};

/// Flattens call parameters into form fields.
///
/// Strings are sent as is, other values in their JSON text form. Nulls are
/// dropped.
pub fn encode_form(params: ApiParams) -> Vec<(String, String)> {
    params
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

/// Extracts the `response` value from a response body.
///
/// # Errors
/// [`ApiError::Vk`] if the body carries an `error` object, and
/// [`ApiError::UnexpectedResponse`] if it carries neither.
pub fn decode_response(mut body: Value) -> ApiResult<Value> {
    if let Some(error) = body.get("error") {
        let code = error
            .get("error_code")
            .and_then(Value::as_i64)
            .unwrap_or_default();
        let message = error
            .get("error_msg")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_owned();
        return Err(ApiError::Vk { code, message });
    }

    body.get_mut("response")
        .map(Value::take)
        .ok_or(ApiError::UnexpectedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_form() {
        let mut params = ApiParams::new();
        params.insert("peer_id".into(), json!(5));
        params.insert("message".into(), json!("hi there"));
        params.insert("skip".into(), Value::Null);

        let mut form = encode_form(params);
        form.sort();
        assert_eq!(
            form,
            vec![
                ("message".to_string(), "hi there".to_string()),
                ("peer_id".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_success() {
        let value = decode_response(json!({"response": {"count": 1}})).unwrap();
        assert_eq!(value, json!({"count": 1}));
    }

    #[test]
    fn test_decode_api_error() {
        let err = decode_response(json!({
            "error": {"error_code": 5, "error_msg": "User authorization failed"}
        }))
        .unwrap_err();
        assert!(matches!(err, ApiError::Vk { code: 5, ref message } if message == "User authorization failed"));
    }

    #[test]
    fn test_decode_unexpected_shape() {
        assert!(matches!(
            decode_response(json!({"ok": true})),
            Err(ApiError::UnexpectedResponse)
        ));
    }
}
