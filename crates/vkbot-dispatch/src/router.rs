//! Routers: a gate plus an ordered handler list.
//!
//! [`Router`] is the capability set a [`Dispatcher`](crate::Dispatcher)
//! relies on. [`DefaultRouter`] composes a [`FilterManager`] as its gate with
//! a [`HandlerRegistrar`] as its dispatch list. Other variants usually keep a
//! registrar too and process events with [`route_through`].
//!
//! # Example
//!
//! ```rust,ignore
//! let mut router = DefaultRouter::named("messages")
//!     .with_filter(EventTypeFilter::new("message_new"));
//!
//! router.register_handler(filters![TextFilter::new("ping")], |event: BotEvent| async move {
//!     Ok(())
//! });
//! router.register_handler(filters![], fallback);
//! ```

use std::borrow::Cow;
use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, trace};
use vkbot_core::BotEvent;

use crate::filter::{BoxedFilter, Filter, FilterManager};
use crate::handler::{Handler, HandlerResult};
use crate::outcome::{HandlerOutcome, RouteOutcome};
use crate::registrar::HandlerRegistrar;

/// Offers an event to each handler in order until one accepts it.
///
/// Handler `i + 1` is never touched before handler `i` has finished.
pub async fn route_through<R: Send + 'static>(
    registrar: &HandlerRegistrar<R>,
    event: &BotEvent,
) -> RouteOutcome<R> {
    for handler in registrar.handlers() {
        match handler.process_event(event).await {
            HandlerOutcome::Passed(result) => {
                debug!(handler = handler.display_name(), "Handler accepted event");
                return RouteOutcome::Handled(result);
            }
            HandlerOutcome::FiltersNotPassed => continue,
        }
    }

    trace!(handlers = registrar.len(), "No handler accepted event");
    RouteOutcome::HandlerNotFound
}

// ============================================================================
// Router Trait
// ============================================================================

/// A router variant.
///
/// Routers know nothing about each other and hold no per-event state, so the
/// same event always yields the same outcome from the same router.
#[async_trait]
pub trait Router<R>: Send + Sync {
    /// Returns `true` if this router should be tried for the event at all.
    async fn is_suitable(&self, event: &BotEvent) -> bool;

    /// Returns the router's handlers.
    fn registrar(&self) -> &HandlerRegistrar<R>;

    /// Processes the event with the first handler that accepts it.
    ///
    /// [`RouteOutcome::HandlerNotFound`] is a normal outcome meaning that
    /// another router may be tried.
    async fn process_event(&self, event: &BotEvent) -> RouteOutcome<R>;

    /// Name used in log output.
    fn name(&self) -> &str {
        "router"
    }
}

// ============================================================================
// DefaultRouter
// ============================================================================

/// The standard router: a conjunctive filter gate and an ordered handler list.
///
/// Registration needs `&mut self`; once the router is handed to a
/// [`Dispatcher`](crate::Dispatcher) it is shared immutably and can no longer
/// change.
pub struct DefaultRouter<R = HandlerResult> {
    name: Cow<'static, str>,
    filter_manager: FilterManager,
    registrar: HandlerRegistrar<R>,
}

impl<R: Send + 'static> DefaultRouter<R> {
    /// Creates a router without filters or handlers.
    pub fn new() -> Self {
        Self::named("default")
    }

    /// Creates a named router.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            filter_manager: FilterManager::new(),
            registrar: HandlerRegistrar::new(),
        }
    }

    /// Adds a router-level filter (builder pattern).
    pub fn with_filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filter_manager.add_filter(filter);
        self
    }

    /// Adds a router-level filter.
    pub fn add_filter<F: Filter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filter_manager.add_filter(filter);
        self
    }

    /// Adds an already boxed router-level filter.
    pub fn add_boxed_filter(&mut self, filter: BoxedFilter) -> &mut Self {
        self.filter_manager.add_boxed(filter);
        self
    }

    /// Returns the router-level filters.
    pub fn filter_manager(&self) -> &FilterManager {
        &self.filter_manager
    }

    /// Returns the registrar for setup code that builds handlers by hand.
    pub fn registrar_mut(&mut self) -> &mut HandlerRegistrar<R> {
        &mut self.registrar
    }

    /// Appends a finished handler.
    pub fn register(&mut self, handler: Handler<R>) -> &mut Self {
        self.registrar.register(handler);
        self
    }

    /// Builds a handler from `filters` and `callback` and appends it.
    ///
    /// Equivalent to building through [`HandlerRegistrar::builder`] and calling
    /// [`register`](Self::register).
    pub fn register_handler<F, Fut>(
        &mut self,
        filters: impl IntoIterator<Item = BoxedFilter>,
        callback: F,
    ) -> &mut Self
    where
        F: Fn(BotEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let handler = self
            .registrar
            .builder()
            .with_filters(filters)
            .handle(callback)
            .ready();
        self.register(handler)
    }
}

impl<R: Send + 'static> Default for DefaultRouter<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Send + 'static> Router<R> for DefaultRouter<R> {
    async fn is_suitable(&self, event: &BotEvent) -> bool {
        self.filter_manager.execute_filters(event).await
    }

    async fn process_event(&self, event: &BotEvent) -> RouteOutcome<R> {
        route_through(&self.registrar, event).await
    }

    fn registrar(&self) -> &HandlerRegistrar<R> {
        &self.registrar
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<R> std::fmt::Debug for DefaultRouter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultRouter")
            .field("name", &self.name)
            .field("filters", &self.filter_manager)
            .field("handler_count", &self.registrar.len())
            .finish()
    }
}
