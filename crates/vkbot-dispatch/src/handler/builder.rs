//! Staged builder for [`Handler`].
//!
//! The builder moves through two stages:
//!
//! 1. [`NoCallback`]: filters and a name may be added.
//! 2. [`WithCallback`]: reached through [`handle`](HandlerBuilder::handle);
//!    only this stage has [`ready`](HandlerBuilder::ready).
//!
//! A handler without a callback therefore cannot be produced, and the
//! filter order is fixed before the callback is attached.

use std::future::Future;
use std::sync::Arc;

use super::Handler;
use super::callback::BoxedCallback;
use crate::filter::{BoxedFilter, Filter};

/// Builder stage before a callback is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallback;

/// Builder stage holding the callback.
pub struct WithCallback<R>(BoxedCallback<R>);

/// Builds a [`Handler`] step by step.
///
/// ```rust,ignore
/// let handler = HandlerBuilder::new()
///     .name("greet")
///     .with_filter(TextFilter::new("hello"))
///     .handle(|event: BotEvent| async move { Ok(()) })
///     .ready();
/// ```
pub struct HandlerBuilder<S = NoCallback> {
    name: Option<String>,
    filters: Vec<BoxedFilter>,
    state: S,
}

impl Default for HandlerBuilder<NoCallback> {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerBuilder<NoCallback> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            name: None,
            filters: Vec::new(),
            state: NoCallback,
        }
    }

    /// Appends a filter. Filters run in the order they are added.
    pub fn with_filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Appends an already boxed filter.
    pub fn with_boxed_filter(mut self, filter: BoxedFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Appends several boxed filters, keeping their order.
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = BoxedFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Attaches the callback, moving to the final stage.
    pub fn handle<F, Fut, R>(self, callback: F) -> HandlerBuilder<WithCallback<R>>
    where
        F: Fn(vkbot_core::BotEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        self.handle_boxed(Arc::new(callback))
    }

    /// Attaches an already boxed callback.
    pub fn handle_boxed<R: Send + 'static>(
        self,
        callback: BoxedCallback<R>,
    ) -> HandlerBuilder<WithCallback<R>> {
        HandlerBuilder {
            name: self.name,
            filters: self.filters,
            state: WithCallback(callback),
        }
    }
}

impl<S> HandlerBuilder<S> {
    /// Sets the name used in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the number of filters added so far.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }
}

impl<R: Send + 'static> HandlerBuilder<WithCallback<R>> {
    /// Finalizes the builder into an immutable handler.
    pub fn ready(self) -> Handler<R> {
        Handler {
            name: self.name,
            filters: self.filters.into(),
            callback: self.state.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{EventTypeFilter, FilterExt, PredicateFilter};
    use crate::outcome::HandlerOutcome;
    use serde_json::json;
    use vkbot_core::BotEvent;

    #[tokio::test]
    async fn test_builder_keeps_filter_order_and_name() {
        let handler = HandlerBuilder::new()
            .name("first")
            .with_filter(EventTypeFilter::new("message_new"))
            .with_boxed_filter(PredicateFilter::new(|_| true).boxed())
            .with_filters(crate::filters![PredicateFilter::new(|_| true)])
            .handle(|_event: BotEvent| async { 7 })
            .ready();

        assert_eq!(handler.name(), Some("first"));
        assert_eq!(handler.filter_count(), 3);

        let event = BotEvent::new("message_new", json!({}));
        assert_eq!(handler.process_event(&event).await, HandlerOutcome::Passed(7));
    }

    #[test]
    fn test_name_can_be_set_after_callback() {
        let builder = HandlerBuilder::new().handle(|_event: BotEvent| async {});
        assert_eq!(builder.filter_count(), 0);
        let handler = builder.name("late").ready();
        assert_eq!(handler.name(), Some("late"));
    }
}
