//! Filter system for the vkbot dispatch layer.
//!
//! A [`Filter`] is a predicate over a [`BotEvent`]. Filters gate both whole
//! routers (through a [`FilterManager`]) and individual handlers.
//!
//! # Failure Handling
//!
//! A filter's raw [`check`](Filter::check) may fail, e.g. a text filter on an
//! event without text. Callers never see that error: [`evaluate`] is the filter
//! boundary and turns every failure into `false`, so one malfunctioning filter
//! cannot abort dispatch for the handlers after it.
//!
//! # Example
//!
//! ```rust,ignore
//! use vkbot_dispatch::filter::{EventTypeFilter, FilterExt, TextFilter};
//!
//! let hello = EventTypeFilter::new("message_new").and(TextFilter::new("hello"));
//! let not_bots = PredicateFilter::new(|event| event.from_id().is_some_and(|id| id > 0));
//! ```

pub mod builtin;
pub mod manager;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;
use vkbot_core::BotEvent;

use crate::error::FilterResult;

pub use builtin::{
    CommandsFilter, EventTypeFilter, FromIdFilter, PayloadFilter, RegexFilter, TextFilter,
};
pub use manager::FilterManager;

/// A type-erased filter that can be shared between handlers and routers.
pub type BoxedFilter = Arc<dyn Filter>;

// ============================================================================
// Filter Trait
// ============================================================================

/// A predicate over an event.
///
/// Implementations must be pure: they may read their own configuration but
/// must not keep per-call state. The same filter is evaluated concurrently
/// for different events.
#[async_trait]
pub trait Filter: Send + Sync {
    /// Checks the event, returning `Err` if the event cannot be evaluated.
    async fn check(&self, event: &BotEvent) -> FilterResult;

    /// Name used in log output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<F: Filter + ?Sized> Filter for Arc<F> {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        (**self).check(event).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Evaluates a filter, degrading any failure to `false`.
pub async fn evaluate<F: Filter + ?Sized>(filter: &F, event: &BotEvent) -> bool {
    match filter.check(event).await {
        Ok(passed) => passed,
        Err(e) => {
            debug!(
                filter = filter.name(),
                event_kind = %event.kind(),
                error = %e,
                "Filter failed, treating as not passed"
            );
            false
        }
    }
}

// ============================================================================
// FilterExt - combinators
// ============================================================================

/// Combinators available on every filter.
pub trait FilterExt: Filter + Sized + 'static {
    /// Boxes this filter into a [`BoxedFilter`].
    fn boxed(self) -> BoxedFilter {
        Arc::new(self)
    }

    /// Passes only if both filters pass. `other` is not evaluated if `self` fails.
    fn and<F: Filter + 'static>(self, other: F) -> And<Self, F> {
        And(self, other)
    }

    /// Passes if either filter passes. `other` is not evaluated if `self` passes.
    fn or<F: Filter + 'static>(self, other: F) -> Or<Self, F> {
        Or(self, other)
    }

    /// Inverts this filter.
    ///
    /// An error from the inner filter is passed through rather than inverted,
    /// so the negation of a failing filter does not pass either.
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<T: Filter + 'static> FilterExt for T {}

/// Conjunction of two filters. See [`FilterExt::and`].
#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

#[async_trait]
impl<A: Filter, B: Filter> Filter for And<A, B> {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        Ok(evaluate(&self.0, event).await && evaluate(&self.1, event).await)
    }

    fn name(&self) -> &'static str {
        "and"
    }
}

/// Disjunction of two filters. See [`FilterExt::or`].
#[derive(Debug, Clone)]
pub struct Or<A, B>(A, B);

#[async_trait]
impl<A: Filter, B: Filter> Filter for Or<A, B> {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        Ok(evaluate(&self.0, event).await || evaluate(&self.1, event).await)
    }

    fn name(&self) -> &'static str {
        "or"
    }
}

/// Negation of a filter. See [`FilterExt::not`].
#[derive(Debug, Clone)]
pub struct Not<F>(F);

#[async_trait]
impl<F: Filter> Filter for Not<F> {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        Ok(!self.0.check(event).await?)
    }

    fn name(&self) -> &'static str {
        "not"
    }
}

// ============================================================================
// Predicate filters
// ============================================================================

/// A filter backed by a synchronous closure.
#[derive(Clone)]
pub struct PredicateFilter(Arc<dyn Fn(&BotEvent) -> bool + Send + Sync>);

impl PredicateFilter {
    /// Creates a new `PredicateFilter` from a synchronous closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&BotEvent) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

#[async_trait]
impl Filter for PredicateFilter {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        Ok((self.0)(event))
    }

    fn name(&self) -> &'static str {
        "predicate"
    }
}

/// A filter backed by an asynchronous closure.
///
/// The closure receives its own clone of the event, so the returned future
/// may outlive the borrow used by the caller.
#[derive(Clone)]
pub struct AsyncPredicateFilter(Arc<dyn Fn(BotEvent) -> BoxFuture<'static, bool> + Send + Sync>);

impl AsyncPredicateFilter {
    /// Creates a new `AsyncPredicateFilter` from an asynchronous closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(BotEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self(Arc::new(move |event| f(event).boxed()))
    }
}

#[async_trait]
impl Filter for AsyncPredicateFilter {
    async fn check(&self, event: &BotEvent) -> FilterResult {
        Ok((self.0)(event.clone()).await)
    }

    fn name(&self) -> &'static str {
        "async_predicate"
    }
}

/// Builds a `Vec<BoxedFilter>` from a list of filters.
///
/// ```rust,ignore
/// router.register_handler(
///     filters![EventTypeFilter::new("message_new"), TextFilter::new("123")],
///     callback,
/// );
/// ```
#[macro_export]
macro_rules! filters {
    ($($filter:expr),* $(,)?) => {
        ::std::vec![$($crate::filter::FilterExt::boxed($filter)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing;

    #[async_trait]
    impl Filter for Failing {
        async fn check(&self, _event: &BotEvent) -> FilterResult {
            Err(FilterError::custom("boom"))
        }
    }

    #[derive(Clone)]
    struct Counting {
        calls: Arc<AtomicUsize>,
        result: bool,
    }

    #[async_trait]
    impl Filter for Counting {
        async fn check(&self, _event: &BotEvent) -> FilterResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result)
        }
    }

    fn event() -> BotEvent {
        BotEvent::new("message_new", json!({"message": {"text": "hi"}}))
    }

    #[tokio::test]
    async fn test_failing_filter_evaluates_to_false() {
        assert!(!evaluate(&Failing, &event()).await);
    }

    #[tokio::test]
    async fn test_and_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let second = Counting {
            calls: Arc::clone(&calls),
            result: true,
        };

        let filter = PredicateFilter::new(|_| false).and(second);
        assert!(!evaluate(&filter, &event()).await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_or_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let second = Counting {
            calls: Arc::clone(&calls),
            result: false,
        };

        let filter = PredicateFilter::new(|_| true).or(second);
        assert!(evaluate(&filter, &event()).await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_inverts_but_keeps_failures() {
        assert!(!evaluate(&PredicateFilter::new(|_| true).not(), &event()).await);
        assert!(evaluate(&PredicateFilter::new(|_| false).not(), &event()).await);
        assert!(!evaluate(&Failing.not(), &event()).await);
        assert!(Failing.not().check(&event()).await.is_err());

        let no_text = BotEvent::new("group_join", json!({"user_id": 1}));
        assert!(!evaluate(&TextFilter::new("x").not(), &no_text).await);
    }

    #[tokio::test]
    async fn test_async_predicate_sees_event() {
        let filter = AsyncPredicateFilter::new(|event: BotEvent| async move {
            tokio::task::yield_now().await;
            event.text() == Some("hi")
        });
        assert!(evaluate(&filter, &event()).await);
    }

    #[tokio::test]
    async fn test_boxed_filter_delegates() {
        let boxed: BoxedFilter = PredicateFilter::new(|_| true).boxed();
        assert!(evaluate(&boxed, &event()).await);
        assert_eq!(boxed.name(), "predicate");

        let list: Vec<BoxedFilter> = crate::filters![Failing, PredicateFilter::new(|_| true)];
        assert_eq!(list.len(), 2);
    }
}
