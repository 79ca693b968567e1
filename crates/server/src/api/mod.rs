pub mod attachments;
pub mod dispatch;
pub mod health;
pub mod recipients;
pub mod schemas;
pub mod selection;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use herald_directory::DirectoryProvider;
use herald_dispatch::DispatchController;
use herald_transport::DynTransport;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::files::FileStore;
use crate::workspace::Workspace;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of the recipient list.
    pub directory: Arc<dyn DirectoryProvider>,
    /// Messaging provider, also held by the controller.
    pub transport: Arc<dyn DynTransport>,
    /// The broadcast controller.
    pub controller: DispatchController,
    /// Loaded recipients, selection and staged attachments.
    pub workspace: Arc<Workspace>,
    /// Uploaded file bytes served to the provider.
    pub files: Arc<FileStore>,
    /// Wait between recipients.
    pub message_delay: Duration,
    /// Externally reachable base URL of this server.
    pub public_url: String,
    /// Path to the UI static files.
    pub ui_path: Option<String>,
    /// Whether the UI is served.
    pub ui_enabled: bool,
}

/// Build the Axum router with all API routes and middleware.
pub fn router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.workspace.attachment_limits().max_size_bytes)
        .unwrap_or(usize::MAX);

    let uploads = Router::new()
        .route(
            "/v1/attachments",
            get(attachments::list)
                .post(attachments::upload)
                .delete(attachments::clear),
        )
        .layer(DefaultBodyLimit::max(max_upload));

    let mut router = Router::new()
        .route("/health", get(health::health))
        // Directory
        .route("/v1/recipients", get(recipients::list))
        .route("/v1/recipients/reload", post(recipients::reload))
        // Selection
        .route(
            "/v1/selection",
            get(selection::get_selection).delete(selection::clear),
        )
        .route("/v1/selection/toggle", post(selection::toggle))
        .route("/v1/selection/all", post(selection::select_all))
        // Attachments
        .merge(uploads)
        .route("/v1/attachments/url", post(attachments::add_url))
        .route("/v1/attachments/{id}", delete(attachments::remove))
        .route("/files/{id}/{file_name}", get(attachments::serve_file))
        // Dispatch
        .route("/v1/dispatch", get(dispatch::status).post(dispatch::start))
        .route("/v1/dispatch/stop", post(dispatch::stop))
        .route("/v1/dispatch/events", get(dispatch::events));

    if let Some(path_str) = state.ui_path.as_ref().filter(|_| state.ui_enabled) {
        let path = std::path::PathBuf::from(path_str);
        if path.exists() {
            let index_path = path.join("index.html");
            router = router.fallback_service(ServeDir::new(path).fallback(ServeFile::new(index_path)));
        } else {
            tracing::warn!(
                path = %path.display(),
                "UI directory not found, UI will not be served"
            );
        }
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
