//! Echo Bot Demo
//!
//! Reads event envelopes, one JSON object per line, from stdin and routes
//! them through two routers:
//!
//! - `callbacks`: callback button presses (`message_event`)
//! - `commands`: new messages with `/ping`, `/echo <text>`, greetings and a fallback
//!
//! Replies go through the API when `VKBOT_API__ACCESS_TOKEN` is set and are
//! only logged otherwise.
//!
//! # Usage
//!
//! ```bash
//! echo '{"type":"message_new","object":{"message":{"text":"/ping","peer_id":1}}}' \
//!     | cargo run --package echo-bot
//! ```

use anyhow::Result;
use futures::{Stream, stream};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use vkbot::core::DisabledTransport;
use vkbot::prelude::*;

// ============================================================================
// Replies
// ============================================================================

async fn reply(api: &Api, event: &BotEvent, text: &str) -> HandlerResult {
    let peer_id = event.peer_id().ok_or("event has no peer_id")?;

    match api.messages().send(SendMessage::new(peer_id, text)).await {
        Ok(message_id) => {
            info!(peer_id, message_id, "Reply sent");
            Ok(())
        }
        Err(ApiError::NotSupported) => {
            info!(peer_id, text, "Reply (API disabled)");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Routers
// ============================================================================

fn callbacks_router(api: &Api) -> DefaultRouter {
    let mut router = DefaultRouter::named("callbacks");
    router.add_filter(EventTypeFilter::new(EventKind::MessageEvent));

    let start_api = api.clone();
    router.register_handler(
        filters![PayloadFilter::new(json!({"command": "start"}))],
        move |event| {
            let api = start_api.clone();
            async move { reply(&api, &event, "Welcome! Send /ping or /echo <text>.").await }
        },
    );

    router
}

fn commands_router(api: &Api) -> Result<DefaultRouter> {
    let mut router = DefaultRouter::named("commands");
    router.add_filter(EventTypeFilter::new(EventKind::MessageNew));

    let ping_api = api.clone();
    router.register_handler(filters![CommandsFilter::new(["ping"])], move |event| {
        let api = ping_api.clone();
        async move { reply(&api, &event, "pong").await }
    });

    let echo_api = api.clone();
    router.register_handler(filters![CommandsFilter::new(["echo"])], move |event| {
        let api = echo_api.clone();
        async move {
            let rest = event
                .text()
                .and_then(|t| t.split_once(' '))
                .map(|(_, rest)| rest.trim())
                .unwrap_or_default();
            if rest.is_empty() {
                reply(&api, &event, "Usage: /echo <text>").await
            } else {
                reply(&api, &event, rest).await
            }
        }
    });

    let greet_api = api.clone();
    let greeting = RegexFilter::new(r"(?i)^(hi|hello|привет)\b")?;
    let handler = router
        .registrar_mut()
        .builder()
        .name("greeting")
        .with_filter(greeting)
        .handle(move |event: BotEvent| {
            let api = greet_api.clone();
            async move { reply(&api, &event, "Hello!").await }
        })
        .ready();
    router.register(handler);

    // Anything else with text is only logged.
    router.register_handler(
        filters![PredicateFilter::new(|event: &BotEvent| event.text().is_some())],
        |event| async move {
            info!(
                from_id = ?event.from_id(),
                text = event.text().unwrap_or_default(),
                "Unhandled message"
            );
            Ok(())
        },
    );

    Ok(router)
}

// ============================================================================
// Event Source
// ============================================================================

/// Event envelopes from stdin; malformed lines are skipped.
fn stdin_events() -> impl Stream<Item = BotEvent> {
    let lines = BufReader::new(tokio::io::stdin()).lines();

    stream::unfold(lines, |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match BotEvent::from_json(&line) {
                    Ok(event) => return Some((event, lines)),
                    Err(e) => warn!(error = %e, "Skipping malformed event"),
                },
                Ok(None) => return None,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    return None;
                }
            }
        }
    })
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let mut runtime = BotRuntime::builder().build()?;

    let api = match runtime.http_transport() {
        Ok(transport) => Api::new(transport),
        Err(e) => {
            warn!(error = %e, "API transport unavailable, replies are only logged");
            Api::new(DisabledTransport)
        }
    };

    runtime.register_router(callbacks_router(&api));
    runtime.register_router(commands_router(&api)?);

    let stats = runtime.run_until_signal(stdin_events()).await?;
    info!(
        handled = stats.handled,
        not_found = stats.not_found,
        failed = stats.failed,
        "Echo bot finished"
    );

    Ok(())
}
