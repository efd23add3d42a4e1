//! Request parameter building.
//!
//! VK expects flat form parameters. [`Params`] converts typed arguments into
//! that shape:
//!
//! | Rust value | Sent as |
//! |------------|---------|
//! | `None` | omitted |
//! | `bool` | `1` / `0` |
//! | list | comma-joined string, omitted when empty |
//! | number / string | as is |

use std::fmt::Display;

use serde_json::Value;
use vkbot_core::ApiParams;

/// Conversion of an argument into a parameter value.
///
/// Returning `None` leaves the parameter out of the request.
pub trait IntoParam {
    /// Converts the value.
    fn into_param(self) -> Option<Value>;
}

macro_rules! impl_into_param_number {
    ($($ty:ty),*) => {
        $(
            impl IntoParam for $ty {
                fn into_param(self) -> Option<Value> {
                    Some(Value::from(self))
                }
            }
        )*
    };
}

impl_into_param_number!(i32, i64, u32, u64, f64);

impl IntoParam for bool {
    fn into_param(self) -> Option<Value> {
        Some(Value::from(u8::from(self)))
    }
}

impl IntoParam for String {
    fn into_param(self) -> Option<Value> {
        Some(Value::String(self))
    }
}

impl IntoParam for &str {
    fn into_param(self) -> Option<Value> {
        Some(Value::String(self.to_owned()))
    }
}

impl IntoParam for &String {
    fn into_param(self) -> Option<Value> {
        Some(Value::String(self.clone()))
    }
}

impl<T: IntoParam> IntoParam for Option<T> {
    fn into_param(self) -> Option<Value> {
        self.and_then(IntoParam::into_param)
    }
}

impl<T: Display> IntoParam for &[T] {
    fn into_param(self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        let joined = self
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Some(Value::String(joined))
    }
}

impl<T: Display> IntoParam for Vec<T> {
    fn into_param(self) -> Option<Value> {
        self.as_slice().into_param()
    }
}

/// Builder for API call parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(ApiParams);

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, skipping values that convert to nothing.
    pub fn set(mut self, key: &str, value: impl IntoParam) -> Self {
        if let Some(value) = value.into_param() {
            self.0.insert(key.to_owned(), value);
        }
        self
    }

    /// Sets `key` to `1` when `flag` is true, leaving it out otherwise.
    pub fn flag(self, key: &str, flag: bool) -> Self {
        self.set(key, flag.then_some(true))
    }

    /// Returns a parameter value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying map.
    pub fn into_inner(self) -> ApiParams {
        self.0
    }
}

impl From<ApiParams> for Params {
    fn from(params: ApiParams) -> Self {
        Self(params)
    }
}

impl From<Params> for ApiParams {
    fn from(params: Params) -> Self {
        params.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_none_is_skipped() {
        let params = Params::new()
            .set("owner_id", Some(5i64))
            .set("group_id", None::<i64>)
            .set("q", "cats");
        assert_eq!(params.get("owner_id"), Some(&json!(5)));
        assert_eq!(params.get("group_id"), None);
        assert_eq!(params.get("q"), Some(&json!("cats")));
    }

    #[test]
    fn test_bools_become_numbers() {
        let params = Params::new()
            .set("add_to_news", true)
            .set("is_anonymous", false)
            .flag("extended", false);
        assert_eq!(params.get("add_to_news"), Some(&json!(1)));
        assert_eq!(params.get("is_anonymous"), Some(&json!(0)));
        assert_eq!(params.get("extended"), None);
    }

    #[test]
    fn test_lists_are_comma_joined() {
        let ids = [1i64, -2, 3];
        let params = Params::new()
            .set("owners_ids", &ids[..])
            .set("stories", vec!["1_2".to_string(), "3_4".to_string()])
            .set("fields", Vec::<String>::new());
        assert_eq!(params.get("owners_ids"), Some(&json!("1,-2,3")));
        assert_eq!(params.get("stories"), Some(&json!("1_2,3_4")));
        assert_eq!(params.get("fields"), None);
    }
}
