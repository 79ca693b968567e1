use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use herald_core::Attachment;
use tracing::info;
use uuid::Uuid;

use crate::error::ServerError;
use crate::files::{StoredFile, file_url};

use super::AppState;
use super::schemas::{AttachmentsResponse, RemovedResponse, UploadQuery, UrlAttachmentRequest};

fn attachments(state: &AppState) -> AttachmentsResponse {
    let limits = state.workspace.attachment_limits();
    AttachmentsResponse {
        attachments: state.workspace.attachments(),
        max_count: limits.max_count,
        max_size_bytes: limits.max_size_bytes,
    }
}

/// Strip any directory part a browser may have sent along with the name.
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim()
}

/// `GET /v1/attachments`
pub async fn list(State(state): State<AppState>) -> Json<AttachmentsResponse> {
    Json(attachments(&state))
}

/// `POST /v1/attachments?file_name=` -- stage an uploaded file.
///
/// The body is the raw file. It is hosted under `/files/{id}/{file_name}`
/// so the provider can fetch it, and its bytes travel with the attachment
/// for transports that upload directly.
pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Attachment>), ServerError> {
    let file_name = base_name(&query.file_name).to_owned();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut attachment = Attachment::new(file_name.clone(), String::new())
        .with_size(u64::try_from(body.len()).unwrap_or(u64::MAX))
        .with_content(body.clone());
    attachment.file_ref = file_url(&state.public_url, attachment.id, &file_name);
    if let Some(ct) = &content_type {
        attachment = attachment.with_content_type(ct.clone());
    }

    state.workspace.add_attachment(attachment.clone())?;
    state.files.insert(
        attachment.id,
        StoredFile {
            file_name,
            content_type,
            bytes: body,
        },
    );

    info!(
        attachment_id = %attachment.id,
        file_name = %attachment.file_name,
        size_bytes = attachment.size_bytes.unwrap_or(0),
        "attachment uploaded"
    );
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// `POST /v1/attachments/url` -- stage a file the provider downloads itself.
pub async fn add_url(
    State(state): State<AppState>,
    Json(req): Json<UrlAttachmentRequest>,
) -> Result<(StatusCode, Json<Attachment>), ServerError> {
    let url = req.url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ServerError::BadRequest(
            "attachment url must be an absolute http(s) URL".into(),
        ));
    }

    let mut attachment = Attachment::new(base_name(&req.file_name), url);
    if let Some(size) = req.size_bytes {
        attachment = attachment.with_size(size);
    }
    state.workspace.add_attachment(attachment.clone())?;

    info!(
        attachment_id = %attachment.id,
        file_name = %attachment.file_name,
        "attachment staged by url"
    );
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// `DELETE /v1/attachments/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Attachment>, ServerError> {
    let attachment = state
        .workspace
        .remove_attachment(id)
        .ok_or_else(|| ServerError::NotFound(format!("no staged attachment with id {id}")))?;
    // An in-flight run may still hand this file to the provider.
    if !state.controller.is_running() {
        state.files.remove(id);
    }
    Ok(Json(attachment))
}

/// `DELETE /v1/attachments`
pub async fn clear(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.workspace.clear_attachments();
    if !state.controller.is_running() {
        for attachment in &removed {
            state.files.remove(attachment.id);
        }
    }
    Json(RemovedResponse {
        removed: removed.len(),
    })
}

/// `GET /files/{id}/{file_name}` -- serve an uploaded file to the provider.
pub async fn serve_file(
    State(state): State<AppState>,
    Path((id, file_name)): Path<(Uuid, String)>,
) -> Result<Response, ServerError> {
    let file = state
        .files
        .get(id)
        .filter(|f| f.file_name == file_name)
        .ok_or_else(|| ServerError::NotFound(format!("no hosted file {id}")))?;

    let content_type = file
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_owned());
    Ok(([(header::CONTENT_TYPE, content_type)], file.bytes).into_response())
}
