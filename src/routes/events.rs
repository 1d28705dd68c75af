//! Server-Sent Events push channel.
//!
//! Every subscriber gets its own broadcast receiver. Delivery is best effort:
//! a subscriber that falls behind skips the events it missed and is told so
//! with a `lagged` comment; it never slows down ingestion.

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use super::AppState;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/events", get(stream_events))
}

async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // ---
    let rx = state.engine.subscribe();
    debug!("Event subscriber connected");

    let stream = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(event) => {
                let sse_event = match event.to_json() {
                    Ok(json) => Event::default().event(event.name()).data(json),
                    Err(e) => {
                        warn!("Failed to serialize {} event: {}", event.name(), e);
                        Event::default().comment("serialization error")
                    }
                };
                Some((Ok(sse_event), rx))
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event subscriber lagged, skipped {} event(s)", skipped);
                Some((Ok(Event::default().comment("lagged")), rx))
            }
            Err(RecvError::Closed) => None,
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
