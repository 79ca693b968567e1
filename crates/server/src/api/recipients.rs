use axum::Json;
use axum::extract::{Query, State};
use tracing::{info, warn};

use crate::error::ServerError;

use super::AppState;
use super::schemas::{RecipientQuery, RecipientView, RecipientsResponse, ReloadResponse};

/// `GET /v1/recipients` -- the loaded directory with selection flags.
///
/// `?q=` keeps only recipients whose name contains the term, ignoring case.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RecipientQuery>,
) -> Json<RecipientsResponse> {
    let needle = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let all = state.workspace.recipients();
    let total = all.len();
    let selected = all.iter().filter(|(_, s)| *s).count();
    let recipients = all
        .into_iter()
        .filter(|(r, _)| {
            needle
                .as_deref()
                .is_none_or(|n| r.display_name.to_lowercase().contains(n))
        })
        .map(|(r, selected)| RecipientView {
            display_name: r.display_name,
            recipient_id: r.recipient_id,
            selected,
        })
        .collect();

    Json(RecipientsResponse {
        recipients,
        total,
        selected,
    })
}

/// `POST /v1/recipients/reload` -- fetch the directory again.
///
/// On failure the list is emptied (and the selection with it) before the
/// error is returned.
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ServerError> {
    let (loaded, pruned) = load_directory(&state).await?;
    Ok(Json(ReloadResponse { loaded, pruned }))
}

/// Load the directory into the workspace. Returns `(loaded, pruned)`.
pub async fn load_directory(state: &AppState) -> Result<(usize, usize), ServerError> {
    match state.directory.fetch_recipients().await {
        Ok(recipients) => {
            let loaded = recipients.len();
            let pruned = state.workspace.replace_recipients(recipients);
            info!(
                directory = state.directory.name(),
                loaded, pruned, "recipient directory loaded"
            );
            Ok((loaded, pruned))
        }
        Err(e) => {
            warn!(directory = state.directory.name(), error = %e, "recipient directory load failed");
            state.workspace.replace_recipients(Vec::new());
            Err(e.into())
        }
    }
}
