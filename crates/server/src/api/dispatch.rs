use std::collections::HashSet;
use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use herald_core::DispatchEvent;
use herald_dispatch::StartOutcome;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, info, warn};

use crate::error::ServerError;

use super::AppState;
use super::schemas::{DispatchRequest, DispatchStartResponse, DispatchStatusResponse, StopResponse};

/// `POST /v1/dispatch` -- start a broadcast to the current selection.
///
/// The selection and staged attachments are copied before the run starts.
/// Answers `202` with the recipient count, or `200` with
/// `"already_running"` when a run is active.
pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<DispatchRequest>,
) -> Result<(StatusCode, Json<DispatchStartResponse>), ServerError> {
    let snapshot = state.workspace.snapshot();

    if !state.controller.is_running() {
        let staged: HashSet<_> = snapshot.attachments.iter().map(|a| a.id).collect();
        let dropped = state.files.retain(|id| staged.contains(id));
        if dropped > 0 {
            debug!(dropped, "released hosted files no longer staged");
        }
    }

    let outcome = state.controller.start(
        snapshot.recipients,
        req.message,
        snapshot.attachments,
        state.message_delay,
    )?;

    Ok(match outcome {
        StartOutcome::Started { total } => {
            info!(total, "dispatch accepted");
            (
                StatusCode::ACCEPTED,
                Json(DispatchStartResponse {
                    status: "started".into(),
                    total: Some(total),
                }),
            )
        }
        StartOutcome::AlreadyRunning => (
            StatusCode::OK,
            Json(DispatchStartResponse {
                status: "already_running".into(),
                total: None,
            }),
        ),
    })
}

/// `POST /v1/dispatch/stop` -- ask the active run to stop after the current
/// recipient.
pub async fn stop(State(state): State<AppState>) -> Json<StopResponse> {
    Json(StopResponse {
        stop_requested: state.controller.request_stop(),
    })
}

/// `GET /v1/dispatch` -- controller state, live progress and last summary.
pub async fn status(State(state): State<AppState>) -> Json<DispatchStatusResponse> {
    Json(DispatchStatusResponse {
        status: state.controller.status(),
        metrics: state.controller.metrics(),
    })
}

/// `GET /v1/dispatch/events` -- dispatch events via Server-Sent Events.
///
/// Each SSE event is named after the event type. Clients that fall behind
/// get a `lagged` event and continue from the newest event.
#[allow(clippy::unused_async)]
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(event_stream(state.controller.subscribe())).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn event_stream(
    rx: broadcast::Receiver<DispatchEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().event(event.kind()).data(json))),
            Err(e) => {
                warn!(error = %e, "failed to serialize dispatch event");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            debug!(skipped = n, "SSE client lagged, skipping events");
            Some(Ok(Event::default()
                .event("lagged")
                .data(format!("{{\"skipped\":{n}}}"))))
        }
    })
}
