//! Event dispatcher.
//!
//! The [`Dispatcher`] owns an ordered list of routers and decides which one
//! processes an event:
//!
//! 1. Routers are asked [`is_suitable`](Router::is_suitable) in registration order
//! 2. The first suitable router processes the event
//! 3. If it reports [`HandlerNotFound`](RouteOutcome::HandlerNotFound), the next
//!    suitable router is tried
//!
//! ```rust,ignore
//! use vkbot_dispatch::{DefaultRouter, Dispatcher};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add_router(message_router);
//! dispatcher.add_router(fallback_router);
//!
//! let outcome = dispatcher.dispatch(&event).await;
//! ```

use std::sync::Arc;

use tracing::{Instrument, debug, debug_span, trace};
use vkbot_core::BotEvent;

use crate::handler::HandlerResult;
use crate::outcome::RouteOutcome;
use crate::router::Router;

/// A type-erased router shared between dispatch tasks.
pub type BoxedRouter<R> = Arc<dyn Router<R>>;

/// The top-level event dispatcher.
///
/// Cloning is cheap and clones share their routers. Adding a router to a
/// dispatcher whose router list is shared copies the list first, so running
/// dispatch tasks never observe a change.
pub struct Dispatcher<R = HandlerResult> {
    routers: Arc<Vec<BoxedRouter<R>>>,
}

impl<R: Send + 'static> Dispatcher<R> {
    /// Creates a dispatcher without routers.
    pub fn new() -> Self {
        Self {
            routers: Arc::new(Vec::new()),
        }
    }

    /// Adds a router. Routers are tried in the order they are added.
    ///
    /// The router is frozen from here on: the dispatcher only ever holds it
    /// behind a shared reference.
    pub fn add_router<T: Router<R> + 'static>(&mut self, router: T) -> &mut Self {
        self.add_boxed(Arc::new(router))
    }

    /// Adds an already boxed router.
    pub fn add_boxed(&mut self, router: BoxedRouter<R>) -> &mut Self {
        Arc::make_mut(&mut self.routers).push(router);
        self
    }

    /// Adds a router (builder pattern).
    pub fn with_router<T: Router<R> + 'static>(mut self, router: T) -> Self {
        self.add_router(router);
        self
    }

    /// Returns the number of routers.
    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    /// Returns the routers in registration order.
    pub fn routers(&self) -> &[BoxedRouter<R>] {
        &self.routers
    }

    /// Dispatches an event.
    ///
    /// Returns the result of the first handler that accepted the event, or
    /// [`RouteOutcome::HandlerNotFound`] if no suitable router had one.
    pub async fn dispatch(&self, event: &BotEvent) -> RouteOutcome<R> {
        let span = debug_span!(
            "dispatch",
            event_kind = %event.kind(),
            event_id = event.event_id().unwrap_or_default()
        );

        async move {
            for router in self.routers.iter() {
                if !router.is_suitable(event).await {
                    trace!(router = router.name(), "Router not suitable");
                    continue;
                }

                match router.process_event(event).await {
                    RouteOutcome::Handled(result) => {
                        debug!(router = router.name(), "Event handled");
                        return RouteOutcome::Handled(result);
                    }
                    RouteOutcome::HandlerNotFound => {
                        debug!(router = router.name(), "No handler in router, trying next");
                    }
                }
            }

            RouteOutcome::HandlerNotFound
        }
        .instrument(span)
        .await
    }
}

impl<R> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            routers: Arc::clone(&self.routers),
        }
    }
}

impl<R: Send + 'static> Default for Dispatcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "routers",
                &self.routers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
