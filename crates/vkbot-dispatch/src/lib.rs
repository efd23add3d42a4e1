//! # vkbot dispatch
//!
//! Decides, for each inbound [`BotEvent`](vkbot_core::BotEvent), which
//! registered handler processes it.
//!
//! - [`filter`]: predicates over events, built-in kinds and combinators
//! - [`FilterManager`]: router-level conjunction of filters
//! - [`Handler`]: ordered filters plus one callback, built with [`HandlerBuilder`]
//! - [`HandlerRegistrar`]: ordered handler list, first match wins
//! - [`Router`] / [`DefaultRouter`]: a filter gate plus a registrar
//! - [`Dispatcher`]: tries routers in order; also a `tower::Service`
//!
//! Control outcomes are dedicated enums ([`HandlerOutcome`], [`RouteOutcome`])
//! and never overlap with callback results.

pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod handler;
pub mod outcome;
pub mod registrar;
pub mod router;
mod service;

pub use dispatcher::{BoxedRouter, Dispatcher};
pub use error::{BoxError, FilterError, FilterResult};
pub use filter::{
    AsyncPredicateFilter, BoxedFilter, CommandsFilter, EventTypeFilter, Filter, FilterExt,
    FilterManager, FromIdFilter, PayloadFilter, PredicateFilter, RegexFilter, TextFilter,
    evaluate,
};
pub use handler::{
    BoxedCallback, Callback, Handler, HandlerBuilder, HandlerResult, NoCallback, WithCallback,
};
pub use outcome::{HandlerOutcome, RouteOutcome};
pub use registrar::HandlerRegistrar;
pub use router::{DefaultRouter, Router, route_through};

/// Commonly used items.
pub mod prelude {
    pub use crate::filters;
    pub use crate::{
        AsyncPredicateFilter, CommandsFilter, DefaultRouter, Dispatcher, EventTypeFilter, Filter,
        FilterExt, FromIdFilter, HandlerBuilder, HandlerOutcome, HandlerResult, PayloadFilter,
        PredicateFilter, RegexFilter, RouteOutcome, Router, TextFilter,
    };
}
