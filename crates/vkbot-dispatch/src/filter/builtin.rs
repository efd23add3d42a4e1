//! Built-in filter kinds.

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use vkbot_core::{BotEvent, EventKind};

use super::Filter;
use crate::error::{FilterError, FilterResult};

fn require_text(event: &BotEvent) -> Result<&str, FilterError> {
    event.text().ok_or(FilterError::MissingField("text"))
}

// ============================================================================
// EventTypeFilter
// ============================================================================

/// Passes events whose kind is one of the configured kinds.
#[derive(Debug, Clone)]
pub struct EventTypeFilter {
    kinds: Vec<EventKind>,
}

impl EventTypeFilter {
    /// Matches a single event kind.
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kinds: vec![kind.into()],
        }
    }

    /// Matches any of the given event kinds.
    pub fn any_of<I, K>(kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<EventKind>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Filter for EventTypeFilter {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        Ok(self.kinds.contains(event.kind()))
    }

    fn name(&self) -> &'static str {
        "event_type"
    }
}

// ============================================================================
// TextFilter
// ============================================================================

/// Passes events whose text equals one of the configured texts.
///
/// Comparison ignores case by default; call [`case_sensitive`](Self::case_sensitive)
/// for exact matching. Events without text fail the check.
#[derive(Debug, Clone)]
pub struct TextFilter {
    texts: Vec<String>,
    ignore_case: bool,
}

impl TextFilter {
    /// Matches a single text.
    pub fn new(text: impl Into<String>) -> Self {
        Self::any_of([text])
    }

    /// Matches any of the given texts.
    pub fn any_of<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            ignore_case: true,
        }
    }

    /// Requires an exact, case-sensitive match.
    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }
}

#[async_trait]
impl Filter for TextFilter {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        let text = require_text(event)?;
        let matched = if self.ignore_case {
            let lowered = text.to_lowercase();
            self.texts.iter().any(|t| t.to_lowercase() == lowered)
        } else {
            self.texts.iter().any(|t| t == text)
        };
        Ok(matched)
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

// ============================================================================
// RegexFilter
// ============================================================================

/// Passes events whose text matches a regular expression.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    regex: Regex,
}

impl RegexFilter {
    /// Compiles `pattern` into a filter.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Wraps an already compiled expression.
    pub fn from_regex(regex: Regex) -> Self {
        Self { regex }
    }
}

#[async_trait]
impl Filter for RegexFilter {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        Ok(self.regex.is_match(require_text(event)?))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

// ============================================================================
// CommandsFilter
// ============================================================================

/// Passes events whose first word is a prefixed command, e.g. `/start`.
#[derive(Debug, Clone)]
pub struct CommandsFilter {
    commands: Vec<String>,
    prefixes: Vec<String>,
    ignore_case: bool,
}

impl CommandsFilter {
    /// Matches any of `commands` prefixed by `/` or `!`.
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            prefixes: vec!["/".to_string(), "!".to_string()],
            ignore_case: true,
        }
    }

    /// Replaces the accepted prefixes.
    pub fn prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Requires commands to match case-sensitively.
    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }

    fn is_command(&self, word: &str) -> bool {
        if self.ignore_case {
            let lowered = word.to_lowercase();
            self.commands.iter().any(|c| c.to_lowercase() == lowered)
        } else {
            self.commands.iter().any(|c| c == word)
        }
    }
}

#[async_trait]
impl Filter for CommandsFilter {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        let Some(first) = require_text(event)?.split_whitespace().next() else {
            return Ok(false);
        };
        Ok(self
            .prefixes
            .iter()
            .filter_map(|prefix| first.strip_prefix(prefix.as_str()))
            .any(|word| self.is_command(word)))
    }

    fn name(&self) -> &'static str {
        "commands"
    }
}

// ============================================================================
// PayloadFilter
// ============================================================================

/// Passes events whose button payload equals the expected JSON value.
///
/// Events without a payload do not pass.
#[derive(Debug, Clone)]
pub struct PayloadFilter {
    expected: Value,
}

impl PayloadFilter {
    /// Matches the given payload.
    pub fn new(expected: Value) -> Self {
        Self { expected }
    }
}

#[async_trait]
impl Filter for PayloadFilter {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        Ok(event.payload().as_ref() == Some(&self.expected))
    }

    fn name(&self) -> &'static str {
        "payload"
    }
}

// ============================================================================
// FromIdFilter
// ============================================================================

/// Passes events sent by one of the given user ids.
#[derive(Debug, Clone)]
pub struct FromIdFilter {
    ids: HashSet<i64>,
}

impl FromIdFilter {
    /// Matches any of the given sender ids.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Filter for FromIdFilter {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        let from_id = event.from_id().ok_or(FilterError::MissingField("from_id"))?;
        Ok(self.ids.contains(&from_id))
    }

    fn name(&self) -> &'static str {
        "from_id"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::evaluate;
    use serde_json::json;

    fn message(text: &str) -> BotEvent {
        BotEvent::new(
            "message_new",
            json!({"message": {"text": text, "from_id": 10, "peer_id": 10}}),
        )
    }

    #[tokio::test]
    async fn test_event_type_filter() {
        let filter = EventTypeFilter::any_of(["message_new", "message_edit"]);
        assert!(evaluate(&filter, &message("x")).await);
        assert!(!evaluate(&filter, &BotEvent::new("group_join", json!({}))).await);
    }

    #[tokio::test]
    async fn test_text_filter_ignores_case_by_default() {
        assert!(evaluate(&TextFilter::new("Hello"), &message("hELLo")).await);
        assert!(!evaluate(&TextFilter::new("Hello").case_sensitive(), &message("hello")).await);
        assert!(evaluate(&TextFilter::any_of(["a", "b"]), &message("b")).await);
    }

    #[tokio::test]
    async fn test_text_filter_reports_missing_text() {
        let event = BotEvent::new("group_join", json!({"user_id": 1}));
        assert!(matches!(
            TextFilter::new("x").check(&event).await,
            Err(FilterError::MissingField("text"))
        ));
        assert!(!evaluate(&TextFilter::new("x"), &event).await);
    }

    #[tokio::test]
    async fn test_regex_filter() {
        let filter = RegexFilter::new(r"^\d{3}$").unwrap();
        assert!(evaluate(&filter, &message("123")).await);
        assert!(!evaluate(&filter, &message("1234")).await);
        assert!(RegexFilter::new("(").is_err());
    }

    #[tokio::test]
    async fn test_commands_filter() {
        let filter = CommandsFilter::new(["start", "help"]);
        assert!(evaluate(&filter, &message("/start now")).await);
        assert!(evaluate(&filter, &message("!HELP")).await);
        assert!(!evaluate(&filter, &message("start")).await);
        assert!(!evaluate(&filter, &message("   ")).await);

        let cyrillic = CommandsFilter::new(["старт"]);
        assert!(evaluate(&cyrillic, &message("/Старт")).await);
        assert!(evaluate(&cyrillic, &message("!СТАРТ сейчас")).await);
        assert!(evaluate(&TextFilter::new("/старт"), &message("/Старт")).await);

        let custom = CommandsFilter::new(["go"]).prefixes(["."]).case_sensitive();
        assert!(evaluate(&custom, &message(".go")).await);
        assert!(!evaluate(&custom, &message(".GO")).await);
    }

    #[tokio::test]
    async fn test_payload_filter() {
        let event = BotEvent::new(
            "message_event",
            json!({"user_id": 1, "payload": {"cmd": "buy"}}),
        );
        assert!(evaluate(&PayloadFilter::new(json!({"cmd": "buy"})), &event).await);
        assert!(!evaluate(&PayloadFilter::new(json!({"cmd": "sell"})), &event).await);
        assert!(!evaluate(&PayloadFilter::new(json!({})), &message("x")).await);
    }

    #[tokio::test]
    async fn test_from_id_filter() {
        assert!(evaluate(&FromIdFilter::new([10, 11]), &message("x")).await);
        assert!(!evaluate(&FromIdFilter::new([12]), &message("x")).await);
        assert!(!evaluate(&FromIdFilter::new([12]), &BotEvent::new("x", json!(null))).await);
    }
}
