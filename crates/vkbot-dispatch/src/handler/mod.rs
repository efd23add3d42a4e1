//! Handlers: ordered filters paired with one callback.

mod builder;
mod callback;

use std::fmt;
use std::sync::Arc;

use tracing::trace;
use vkbot_core::BotEvent;

use crate::filter::{BoxedFilter, evaluate};
use crate::outcome::HandlerOutcome;

pub use builder::{HandlerBuilder, NoCallback, WithCallback};
pub use callback::{BoxedCallback, Callback, HandlerResult};

/// An immutable unit that decides whether it accepts an event and, if so,
/// runs its callback.
///
/// Built through [`HandlerBuilder`]; there is no way to change filters or the
/// callback afterwards.
pub struct Handler<R> {
    name: Option<String>,
    filters: Arc<[BoxedFilter]>,
    callback: BoxedCallback<R>,
}

impl<R: Send + 'static> Handler<R> {
    /// Offers the event to this handler.
    ///
    /// Filters run in registration order and the first one that does not pass
    /// ends processing with [`HandlerOutcome::FiltersNotPassed`], leaving the
    /// callback untouched. Otherwise the callback's result is returned as is,
    /// errors included.
    pub async fn process_event(&self, event: &BotEvent) -> HandlerOutcome<R> {
        for (i, filter) in self.filters.iter().enumerate() {
            if !evaluate(filter.as_ref(), event).await {
                trace!(
                    handler = self.display_name(),
                    filter = filter.name(),
                    filter_index = i,
                    "Handler filter rejected event"
                );
                return HandlerOutcome::FiltersNotPassed;
            }
        }

        HandlerOutcome::Passed(self.callback.call(event.clone()).await)
    }
}

impl<R> Handler<R> {
    /// Returns the handler's name, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the number of filters.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

impl<R> Clone for Handler<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            filters: Arc::clone(&self.filters),
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<R> fmt::Debug for Handler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("filter_count", &self.filters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterResult;
    use crate::filter::{Filter, FilterExt, PredicateFilter};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        calls: Arc<AtomicUsize>,
        result: bool,
    }

    #[async_trait]
    impl Filter for Fixed {
        async fn check(&self, _event: &BotEvent) -> FilterResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result)
        }
    }

    fn fixed(calls: &Arc<AtomicUsize>, result: bool) -> BoxedFilter {
        Fixed {
            calls: Arc::clone(calls),
            result,
        }
        .boxed()
    }

    fn counting_handler(
        f1: bool,
        f2: bool,
        callback_calls: &Arc<AtomicUsize>,
        filter_calls: &Arc<AtomicUsize>,
    ) -> Handler<&'static str> {
        let callback_calls = Arc::clone(callback_calls);
        HandlerBuilder::new()
            .with_filters([fixed(filter_calls, f1), fixed(filter_calls, f2)])
            .handle(move |_event: BotEvent| {
                callback_calls.fetch_add(1, Ordering::SeqCst);
                async { "C" }
            })
            .ready()
    }

    fn event() -> BotEvent {
        BotEvent::new("message_new", json!({"message": {"text": "hi"}}))
    }

    #[tokio::test]
    async fn test_first_filter_fails() {
        let callback_calls = Arc::new(AtomicUsize::new(0));
        let filter_calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(false, true, &callback_calls, &filter_calls);

        assert_eq!(
            handler.process_event(&event()).await,
            HandlerOutcome::FiltersNotPassed
        );
        assert_eq!(filter_calls.load(Ordering::SeqCst), 1);
        assert_eq!(callback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_filter_fails() {
        let callback_calls = Arc::new(AtomicUsize::new(0));
        let filter_calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(true, false, &callback_calls, &filter_calls);

        assert_eq!(
            handler.process_event(&event()).await,
            HandlerOutcome::FiltersNotPassed
        );
        assert_eq!(filter_calls.load(Ordering::SeqCst), 2);
        assert_eq!(callback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_filters_pass_returns_callback_result() {
        let callback_calls = Arc::new(AtomicUsize::new(0));
        let filter_calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(true, true, &callback_calls, &filter_calls);

        assert_eq!(
            handler.process_event(&event()).await,
            HandlerOutcome::Passed("C")
        );
        assert_eq!(callback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_filters_always_invokes_callback() {
        let handler = HandlerBuilder::new()
            .handle(|event: BotEvent| async move { event.kind().to_string() })
            .ready();

        for kind in ["message_new", "group_join", "whatever"] {
            let outcome = handler.process_event(&BotEvent::new(kind, json!(null))).await;
            assert_eq!(outcome, HandlerOutcome::Passed(kind.to_string()));
        }
    }

    #[tokio::test]
    async fn test_callback_error_is_returned_unchanged() {
        let handler = HandlerBuilder::new()
            .with_filter(PredicateFilter::new(|_| true))
            .handle(|_event: BotEvent| async { Err::<(), _>("callback failed") })
            .ready();

        assert_eq!(
            handler.process_event(&event()).await,
            HandlerOutcome::Passed(Err("callback failed"))
        );
    }

    #[tokio::test]
    async fn test_unit_result_is_distinct_from_not_passed() {
        let handler = HandlerBuilder::new()
            .handle(|_event: BotEvent| async {})
            .ready();
        let outcome = handler.process_event(&event()).await;
        assert!(outcome.is_passed());
        assert_ne!(outcome, HandlerOutcome::FiltersNotPassed);
    }
}
