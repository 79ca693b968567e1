use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::{HealthResponse, TransportHealth};

/// `GET /health` -- service status, provider health and dispatch counters.
///
/// Always answers `200`; an unhealthy provider is reported in the body.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let transport = match state.transport.health_check().await {
        Ok(()) => TransportHealth {
            name: state.transport.name().to_owned(),
            healthy: true,
            error: None,
        },
        Err(e) => {
            tracing::warn!(
                transport = state.transport.name(),
                error = %e,
                "transport health check failed"
            );
            TransportHealth {
                name: state.transport.name().to_owned(),
                healthy: false,
                error: Some(e.to_string()),
            }
        }
    };

    Json(HealthResponse {
        status: "ok".into(),
        transport,
        directory: state.directory.name().to_owned(),
        recipients: state.workspace.recipient_count(),
        metrics: state.controller.metrics(),
    })
}
