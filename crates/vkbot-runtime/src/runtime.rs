//! The event loop.
//!
//! [`BotRuntime`] owns a [`Dispatcher`] and drives it over a stream of
//! inbound events, one tokio task per event.
//!
//! ```rust,ignore
//! use vkbot_runtime::BotRuntime;
//!
//! let mut runtime = BotRuntime::builder().profile("production").build()?;
//! runtime.register_router(messages_router);
//! runtime.run_until_signal(long_poll_events).await?;
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower::timeout::error::Elapsed;
use tower::util::BoxCloneSyncService;
use tower::{ServiceBuilder, ServiceExt};
use tracing::{Instrument, debug, debug_span, error, info, warn};

use vkbot_core::BotEvent;
use vkbot_dispatch::{BoxError, BoxedRouter, Dispatcher, HandlerResult, RouteOutcome, Router};

use crate::config::{BotConfig, ConfigLoader, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

type DispatchService = BoxCloneSyncService<BotEvent, RouteOutcome<HandlerResult>, BoxError>;

/// Event counters, cumulative over the runtime's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Events taken from the stream.
    pub received: u64,
    /// Events whose callback returned `Ok`.
    pub handled: u64,
    /// Events no handler accepted.
    pub not_found: u64,
    /// Events whose callback returned an error.
    pub failed: u64,
    /// Events that hit the dispatch timeout.
    pub timed_out: u64,
}

impl RuntimeStats {
    /// Events that finished processing, in any way.
    pub fn completed(&self) -> u64 {
        self.handled + self.not_found + self.failed + self.timed_out
    }
}

/// Drives a [`Dispatcher`] over an event stream.
///
/// Routers are registered through `&mut self` before running; `run` only
/// needs `&self`, so registration is impossible while events are in flight.
pub struct BotRuntime {
    config: BotConfig,
    dispatcher: Dispatcher<HandlerResult>,
    stats: Arc<Mutex<RuntimeStats>>,
    shutdown: CancellationToken,
    running: AtomicBool,
}

impl BotRuntime {
    /// Creates a runtime builder that loads configuration from files and the environment.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from a loaded configuration.
    ///
    /// Validates the configuration and initializes logging from it.
    pub fn from_config(config: BotConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            dispatch_timeout_ms = ?config.dispatch.timeout_ms,
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config,
            dispatcher: Dispatcher::new(),
            stats: Arc::new(Mutex::new(RuntimeStats::default())),
            shutdown: CancellationToken::new(),
            running: AtomicBool::new(false),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Returns the dispatcher events are routed through.
    pub fn dispatcher(&self) -> &Dispatcher<HandlerResult> {
        &self.dispatcher
    }

    /// Appends a router; routers are tried in registration order.
    pub fn register_router<T: Router<HandlerResult> + 'static>(&mut self, router: T) -> &mut Self {
        self.dispatcher.add_router(router);
        self
    }

    /// Appends an already shared router.
    pub fn register_boxed_router(&mut self, router: BoxedRouter<HandlerResult>) -> &mut Self {
        self.dispatcher.add_boxed(router);
        self
    }

    /// Builds an HTTP API transport from the `[api]` section.
    #[cfg(feature = "http-client")]
    pub fn http_transport(&self) -> RuntimeResult<vkbot_transport::HttpTransport> {
        let config = self.config.api.transport_config()?;
        Ok(vkbot_transport::HttpTransport::new(config)?)
    }

    /// Returns a snapshot of the event counters.
    pub fn stats(&self) -> RuntimeStats {
        *self.stats.lock()
    }

    /// Returns the token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stops accepting events. In-flight events still finish.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Returns whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Processes events until the stream ends or [`shutdown`](Self::shutdown) is called.
    ///
    /// Every event is dispatched in its own task; the method returns once all
    /// of them have finished.
    ///
    /// # Errors
    /// [`RuntimeError::AlreadyRunning`] if another run is in progress and
    /// [`RuntimeError::ShutDown`] if the runtime was already shut down.
    pub async fn run<S>(&self, events: S) -> RuntimeResult<RuntimeStats>
    where
        S: Stream<Item = BotEvent>,
    {
        if self.shutdown.is_cancelled() {
            return Err(RuntimeError::ShutDown);
        }
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        let service = self.dispatch_service();
        let tracker = TaskTracker::new();
        let mut events = std::pin::pin!(events);

        info!(
            routers = self.dispatcher.router_count(),
            "vkbot runtime is now running"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested, no longer accepting events");
                    break;
                }
                next = events.next() => match next {
                    Some(event) => {
                        self.stats.lock().received += 1;
                        let span = debug_span!("event", event_kind = %event.kind());
                        tracker.spawn(
                            process_event(service.clone(), Arc::clone(&self.stats), event)
                                .instrument(span),
                        );
                    }
                    None => {
                        info!("Event stream ended");
                        break;
                    }
                }
            }
        }

        tracker.close();
        if !tracker.is_empty() {
            debug!(in_flight = tracker.len(), "Waiting for in-flight events");
        }
        tracker.wait().await;

        let stats = self.stats();
        info!(
            received = stats.received,
            handled = stats.handled,
            not_found = stats.not_found,
            failed = stats.failed,
            timed_out = stats.timed_out,
            "Runtime stopped"
        );
        Ok(stats)
    }

    /// Like [`run`](Self::run), but also shuts down on Ctrl+C or SIGTERM.
    pub async fn run_until_signal<S>(&self, events: S) -> RuntimeResult<RuntimeStats>
    where
        S: Stream<Item = BotEvent>,
    {
        let signal = shutdown_signal()?;
        let mut run = std::pin::pin!(self.run(events));

        tokio::select! {
            result = &mut run => return result,
            () = signal => self.shutdown(),
        }

        run.await
    }

    fn dispatch_service(&self) -> DispatchService {
        let dispatcher = self.dispatcher.clone();
        match self.config.dispatch.timeout() {
            Some(timeout) => {
                BoxCloneSyncService::new(ServiceBuilder::new().timeout(timeout).service(dispatcher))
            }
            None => BoxCloneSyncService::new(
                dispatcher.map_err(|never: Infallible| -> BoxError { match never {} }),
            ),
        }
    }
}

impl std::fmt::Debug for BotRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotRuntime")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .field("stats", &self.stats())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Clears the running flag when `run` returns or its future is dropped.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn process_event(service: DispatchService, stats: Arc<Mutex<RuntimeStats>>, event: BotEvent) {
    match service.oneshot(event).await {
        Ok(RouteOutcome::Handled(Ok(()))) => {
            stats.lock().handled += 1;
        }
        Ok(RouteOutcome::Handled(Err(e))) => {
            stats.lock().failed += 1;
            warn!(error = %e, "Handler callback failed");
        }
        Ok(RouteOutcome::HandlerNotFound) => {
            stats.lock().not_found += 1;
            debug!("No handler accepted the event");
        }
        Err(e) if e.is::<Elapsed>() => {
            stats.lock().timed_out += 1;
            warn!("Event processing timed out");
        }
        Err(e) => {
            stats.lock().failed += 1;
            error!(error = %e, "Event dispatch failed");
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM. Handlers are installed before returning.
#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            Ok(()) = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    })
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`BotRuntime`] with loaded configuration.
///
/// ```rust,ignore
/// let runtime = BotRuntime::builder()
///     .config_file("deploy/vkbot.toml")
///     .router(router)
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    routers: Vec<BoxedRouter<HandlerResult>>,
}

impl std::fmt::Debug for RuntimeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.routers.iter().map(|r| r.name()).collect();
        f.debug_struct("RuntimeBuilder")
            .field("config_loader", &self.config_loader)
            .field("routers", &names)
            .finish()
    }
}

impl RuntimeBuilder {
    /// Creates a builder with the default configuration search.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            routers: Vec::new(),
        }
    }

    /// Loads exactly this configuration file.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration values on top of all other sources.
    pub fn merge<T: Serialize>(mut self, values: T) -> Self {
        self.config_loader = self.config_loader.merge(values);
        self
    }

    /// Appends a router.
    pub fn router<T: Router<HandlerResult> + 'static>(mut self, router: T) -> Self {
        self.routers.push(Arc::new(router));
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<BotRuntime> {
        let config = self.config_loader.load()?;
        let mut runtime = BotRuntime::from_config(config)?;
        for router in self.routers {
            runtime.register_boxed_router(router);
        }
        Ok(runtime)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
