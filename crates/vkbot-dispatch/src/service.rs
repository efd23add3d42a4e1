//! tower integration.
//!
//! [`Dispatcher`] implements `tower::Service<BotEvent>`, so dispatch can be
//! wrapped in ordinary tower middleware such as a timeout:
//!
//! ```rust,ignore
//! let svc = ServiceBuilder::new()
//!     .timeout(Duration::from_secs(10))
//!     .service(dispatcher);
//! ```

use std::convert::Infallible;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use vkbot_core::BotEvent;

use crate::dispatcher::Dispatcher;
use crate::outcome::RouteOutcome;

impl<R: Send + 'static> Service<BotEvent> for Dispatcher<R> {
    type Response = RouteOutcome<R>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: BotEvent) -> Self::Future {
        let dispatcher = self.clone();
        async move { Ok(dispatcher.dispatch(&event).await) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters;
    use crate::router::DefaultRouter;
    use futures::task::noop_waker_ref;
    use serde_json::json;
    use tower::ServiceExt;

    fn dispatcher() -> Dispatcher<u32> {
        let mut router = DefaultRouter::new();
        router.register_handler(filters![], |event: BotEvent| async move {
            event.group_id().unwrap_or_default() as u32
        });
        Dispatcher::new().with_router(router)
    }

    #[test]
    fn test_always_ready() {
        let mut svc = dispatcher();
        let mut cx = Context::from_waker(noop_waker_ref());
        assert!(matches!(svc.poll_ready(&mut cx), Poll::Ready(Ok(()))));
    }

    #[test]
    fn test_oneshot_dispatches() {
        let event = BotEvent::new("message_new", json!({})).with_group_id(42);
        let outcome = tokio_test::block_on(dispatcher().oneshot(event));
        assert_eq!(outcome, Ok(RouteOutcome::Handled(42)));
    }
}
