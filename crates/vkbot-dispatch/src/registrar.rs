//! Ordered handler storage for a router.

use std::fmt;

use crate::handler::{Handler, HandlerBuilder};

/// An append-only, ordered list of handlers.
///
/// Insertion order is dispatch priority: the first handler that accepts an
/// event wins.
pub struct HandlerRegistrar<R> {
    handlers: Vec<Handler<R>>,
}

impl<R> HandlerRegistrar<R> {
    /// Creates an empty registrar.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Starts building a new, unattached handler.
    ///
    /// The built handler is only dispatched to after it is passed to
    /// [`register`](Self::register).
    pub fn builder(&self) -> HandlerBuilder {
        HandlerBuilder::new()
    }

    /// Appends a handler to the end of the list.
    pub fn register(&mut self, handler: Handler<R>) {
        self.handlers.push(handler);
    }

    /// Returns the handlers in registration order.
    pub fn handlers(&self) -> &[Handler<R>] {
        &self.handlers
    }

    /// Returns the number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers were registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<R> Default for HandlerRegistrar<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for HandlerRegistrar<R> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<R> fmt::Debug for HandlerRegistrar<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.handlers).finish()
    }
}
