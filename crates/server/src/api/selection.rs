use axum::Json;
use axum::extract::State;
use herald_core::RecipientId;

use crate::error::ServerError;

use super::AppState;
use super::schemas::{SelectionResponse, ToggleRequest, ToggleResponse};

fn selection(state: &AppState) -> SelectionResponse {
    let ids = state.workspace.selected_ids();
    SelectionResponse {
        count: ids.len(),
        ids,
    }
}

/// `GET /v1/selection`
pub async fn get_selection(State(state): State<AppState>) -> Json<SelectionResponse> {
    Json(selection(&state))
}

/// `POST /v1/selection/toggle` -- flip one recipient in or out of the selection.
pub async fn toggle(
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ServerError> {
    let id = RecipientId::new(&req.id)
        .ok_or_else(|| ServerError::BadRequest("recipient id must not be empty".into()))?;
    let selected = state
        .workspace
        .toggle(&id)
        .ok_or_else(|| ServerError::NotFound(format!("no loaded recipient with id {id}")))?;
    Ok(Json(ToggleResponse { id, selected }))
}

/// `POST /v1/selection/all` -- select every recipient that has an identifier.
pub async fn select_all(State(state): State<AppState>) -> Json<SelectionResponse> {
    state.workspace.select_all();
    Json(selection(&state))
}

/// `DELETE /v1/selection`
pub async fn clear(State(state): State<AppState>) -> Json<SelectionResponse> {
    state.workspace.clear_selection();
    Json(selection(&state))
}
