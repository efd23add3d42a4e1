//! Control outcomes of handler and router processing.
//!
//! Both "not passed" and "not found" are dedicated enum variants rather than
//! placeholder values, so they can never be confused with a callback result,
//! even when the callback itself returns `()` or `None`.

/// The result of offering an event to a single [`Handler`](crate::handler::Handler).
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum HandlerOutcome<R> {
    /// All filters passed; carries the callback's result unchanged.
    Passed(R),
    /// A filter rejected the event; the callback was not invoked.
    FiltersNotPassed,
}

impl<R> HandlerOutcome<R> {
    /// Returns `true` if the handler accepted the event.
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    /// Returns the callback result, if the handler accepted the event.
    pub fn into_result(self) -> Option<R> {
        match self {
            Self::Passed(r) => Some(r),
            Self::FiltersNotPassed => None,
        }
    }
}

/// The result of offering an event to a [`Router`](crate::router::Router).
///
/// [`HandlerNotFound`](RouteOutcome::HandlerNotFound) is an expected outcome,
/// not an error: the caller should try another router.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RouteOutcome<R> {
    /// A handler accepted the event; carries its callback result unchanged.
    Handled(R),
    /// No handler accepted the event.
    HandlerNotFound,
}

impl<R> RouteOutcome<R> {
    /// Returns `true` if a handler accepted the event.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// Returns `true` if no handler accepted the event.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HandlerNotFound)
    }

    /// Returns the callback result, if a handler accepted the event.
    pub fn into_handled(self) -> Option<R> {
        match self {
            Self::Handled(r) => Some(r),
            Self::HandlerNotFound => None,
        }
    }

    /// Maps the callback result, keeping `HandlerNotFound` as is.
    pub fn map<U, F: FnOnce(R) -> U>(self, f: F) -> RouteOutcome<U> {
        match self {
            Self::Handled(r) => RouteOutcome::Handled(f(r)),
            Self::HandlerNotFound => RouteOutcome::HandlerNotFound,
        }
    }
}

impl<R> From<HandlerOutcome<R>> for RouteOutcome<R> {
    fn from(outcome: HandlerOutcome<R>) -> Self {
        match outcome {
            HandlerOutcome::Passed(r) => Self::Handled(r),
            HandlerOutcome::FiltersNotPassed => Self::HandlerNotFound,
        }
    }
}
