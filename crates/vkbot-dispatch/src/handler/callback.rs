//! Application-supplied callbacks.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use vkbot_core::BotEvent;

use crate::error::BoxError;

/// The result type callbacks return when driven by the runtime.
pub type HandlerResult = Result<(), BoxError>;

/// A type-erased callback shared by a handler.
pub type BoxedCallback<R> = Arc<dyn Callback<R>>;

/// An async unit of work invoked when a handler accepts an event.
///
/// The result is opaque to the dispatch layer and is returned unchanged.
/// Any async closure `Fn(BotEvent) -> impl Future<Output = R>` is a callback.
#[async_trait]
pub trait Callback<R>: Send + Sync {
    /// Runs the callback with its own handle to the event.
    async fn call(&self, event: BotEvent) -> R;
}

#[async_trait]
impl<F, Fut, R> Callback<R> for F
where
    F: Fn(BotEvent) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send,
    R: Send + 'static,
{
    async fn call(&self, event: BotEvent) -> R {
        (self)(event).await
    }
}
