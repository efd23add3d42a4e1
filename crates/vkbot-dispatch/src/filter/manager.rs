//! Router-level filter collection.

use std::fmt;
use std::sync::Arc;

use tracing::trace;
use vkbot_core::BotEvent;

use super::{BoxedFilter, Filter, evaluate};

/// An ordered collection of filters evaluated as a conjunction.
///
/// An empty manager passes every event. Evaluation stops at the first filter
/// that does not pass.
#[derive(Clone, Default)]
pub struct FilterManager {
    filters: Vec<BoxedFilter>,
}

impl FilterManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter.
    pub fn add_filter<F: Filter + 'static>(&mut self, filter: F) {
        self.filters.push(Arc::new(filter));
    }

    /// Appends an already boxed filter.
    pub fn add_boxed(&mut self, filter: BoxedFilter) {
        self.filters.push(filter);
    }

    /// Returns the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no filters were added.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns `true` if every filter passes the event.
    pub async fn execute_filters(&self, event: &BotEvent) -> bool {
        for (i, filter) in self.filters.iter().enumerate() {
            if !evaluate(filter.as_ref(), event).await {
                trace!(
                    filter = filter.name(),
                    filter_index = i,
                    "Router filter rejected event"
                );
                return false;
            }
        }
        true
    }
}

impl Extend<BoxedFilter> for FilterManager {
    fn extend<T: IntoIterator<Item = BoxedFilter>>(&mut self, iter: T) {
        self.filters.extend(iter);
    }
}

impl FromIterator<BoxedFilter> for FilterManager {
    fn from_iter<T: IntoIterator<Item = BoxedFilter>>(iter: T) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for FilterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterResult;
    use crate::filter::{EventTypeFilter, FilterExt, PredicateFilter};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    fn event(kind: &str) -> BotEvent {
        BotEvent::new(kind, json!({}))
    }

    #[tokio::test]
    async fn test_empty_manager_passes_everything() {
        let manager = FilterManager::new();
        assert!(manager.is_empty());
        assert!(manager.execute_filters(&event("message_new")).await);
        assert!(manager.execute_filters(&event("anything")).await);
    }

    #[tokio::test]
    async fn test_conjunction_of_all_filters() {
        let mut manager = FilterManager::new();
        manager.add_filter(EventTypeFilter::new("message_new"));
        manager.add_filter(PredicateFilter::new(|e| e.group_id() == Some(1)));

        assert!(
            manager
                .execute_filters(&event("message_new").with_group_id(1))
                .await
        );
        assert!(!manager.execute_filters(&event("message_new")).await);
        assert!(
            !manager
                .execute_filters(&event("group_join").with_group_id(1))
                .await
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_false() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));

        let mut manager = FilterManager::new();
        manager.add_filter(Counting {
            calls: Arc::clone(&before),
            result: true,
        });
        manager.add_filter(PredicateFilter::new(|_| false));
        manager.add_boxed(
            Counting {
                calls: Arc::clone(&after),
                result: true,
            }
            .boxed(),
        );

        assert!(!manager.execute_filters(&event("message_new")).await);
        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_collects_from_boxed_filters() {
        let manager: FilterManager = crate::filters![
            EventTypeFilter::new("message_new"),
            PredicateFilter::new(|_| true),
        ]
        .into_iter()
        .collect();
        assert_eq!(manager.len(), 2);
        assert!(manager.execute_filters(&event("message_new")).await);
    }
}
