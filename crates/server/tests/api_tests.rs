use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use parking_lot::Mutex;
use tower::ServiceExt;

use herald_core::{
    Ack, AddressingPolicy, Attachment, AttachmentLimits, ChatId, Recipient, RecipientId,
};
use herald_directory::{DirectoryError, DirectoryProvider, StaticDirectory};
use herald_dispatch::DispatchController;
use herald_server::api::{AppState, recipients};
use herald_server::files::FileStore;
use herald_server::workspace::Workspace;
use herald_transport::{Transport, TransportError};

const PUBLIC_URL: &str = "http://herald.test";
const HARBOR: &str = "120363000000000001";
const ORCHARD: &str = "120363000000000002";

// -- Mock transport -------------------------------------------------------

#[derive(Default)]
struct MockTransport {
    policy: AddressingPolicy,
    texts: Mutex<Vec<String>>,
    files: Mutex<Vec<(String, String)>>,
    file_contents: Mutex<Vec<Option<Vec<u8>>>>,
    unhealthy: bool,
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn normalize_recipient(&self, id: &RecipientId) -> Result<ChatId, TransportError> {
        Ok(self.policy.normalize(id)?)
    }

    async fn send_text(&self, chat: &ChatId, _body: &str) -> Result<Ack, TransportError> {
        self.texts.lock().push(chat.as_str().to_owned());
        Ok(Ack::with_id("msg"))
    }

    async fn send_file(
        &self,
        chat: &ChatId,
        _caption: &str,
        file: &Attachment,
    ) -> Result<Ack, TransportError> {
        self.files
            .lock()
            .push((chat.as_str().to_owned(), file.file_name.clone()));
        self.file_contents
            .lock()
            .push(file.content.as_ref().map(|c| c.to_vec()));
        Ok(Ack::with_id("file"))
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        if self.unhealthy {
            Err(TransportError::Connection("instance not authorized".into()))
        } else {
            Ok(())
        }
    }
}

struct FailingDirectory;

#[async_trait]
impl DirectoryProvider for FailingDirectory {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch_recipients(&self) -> Result<Vec<Recipient>, DirectoryError> {
        Err(DirectoryError::SourceUnavailable(
            "sheet export returned HTTP 404".into(),
        ))
    }
}

// -- Helpers --------------------------------------------------------------

struct Harness {
    state: AppState,
    transport: Arc<MockTransport>,
}

fn static_directory() -> Arc<dyn DirectoryProvider> {
    Arc::new(StaticDirectory::new([
        ("Orchard", Some(ORCHARD)),
        ("Harbor", Some(HARBOR)),
        ("Hill", None),
    ]))
}

async fn harness_with(
    directory: Arc<dyn DirectoryProvider>,
    transport: MockTransport,
    delay: Duration,
    limits: AttachmentLimits,
) -> Harness {
    let transport = Arc::new(transport);
    let state = AppState {
        directory,
        transport: transport.clone(),
        controller: DispatchController::new(transport.clone()),
        workspace: Arc::new(Workspace::new(limits)),
        files: Arc::new(FileStore::new()),
        message_delay: delay,
        public_url: PUBLIC_URL.into(),
        ui_path: None,
        ui_enabled: false,
    };
    let _ = recipients::load_directory(&state).await;
    Harness { state, transport }
}

async fn harness() -> Harness {
    harness_with(
        static_directory(),
        MockTransport::default(),
        Duration::ZERO,
        AttachmentLimits::default(),
    )
    .await
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let app = herald_server::api::router(state.clone());
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn json(state: &AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(state, request).await;
    let value = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(http::Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn wait_for_state(state: &AppState, expected: &str) -> serde_json::Value {
    for _ in 0..200 {
        let (_, body) = json(state, get("/v1/dispatch")).await;
        if body["state"] == expected {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("dispatch never reached state {expected}");
}

// -- Health ---------------------------------------------------------------

#[tokio::test]
async fn health_reports_transport_and_directory() {
    let h = harness().await;
    let (status, body) = json(&h.state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["transport"]["name"], "mock");
    assert_eq!(body["transport"]["healthy"], true);
    assert_eq!(body["directory"], "static");
    assert_eq!(body["recipients"], 3);
    assert_eq!(body["metrics"]["runs_started"], 0);
}

#[tokio::test]
async fn health_reports_unhealthy_transport() {
    let h = harness_with(
        static_directory(),
        MockTransport {
            unhealthy: true,
            ..MockTransport::default()
        },
        Duration::ZERO,
        AttachmentLimits::default(),
    )
    .await;
    let (status, body) = json(&h.state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transport"]["healthy"], false);
    assert!(
        body["transport"]["error"]
            .as_str()
            .unwrap()
            .contains("not authorized")
    );
}

// -- Recipients -----------------------------------------------------------

#[tokio::test]
async fn recipients_are_sorted_with_flags() {
    let h = harness().await;
    let (status, body) = json(&h.state, get("/v1/recipients")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["recipients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["display_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Harbor", "Hill", "Orchard"]);
    assert_eq!(body["recipients"][1]["recipient_id"], serde_json::Value::Null);
    assert_eq!(body["total"], 3);
    assert_eq!(body["selected"], 0);
}

#[tokio::test]
async fn recipients_filter_ignores_case() {
    let h = harness().await;
    let (_, body) = json(&h.state, get("/v1/recipients?q=HAR")).await;
    let list = body["recipients"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["display_name"], "Harbor");
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn reload_prunes_selection() {
    let h = harness().await;
    json(&h.state, post_empty("/v1/selection/all")).await;

    let (status, body) = json(&h.state, post_empty("/v1/recipients/reload")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loaded"], 3);
    assert_eq!(body["pruned"], 0);
}

#[tokio::test]
async fn reload_failure_empties_list() {
    let h = harness().await;
    let failing = AppState {
        directory: Arc::new(FailingDirectory),
        ..h.state.clone()
    };
    json(&failing, post_empty("/v1/selection/all")).await;

    let (status, body) = json(&failing, post_empty("/v1/recipients/reload")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("HTTP 404"));

    let (_, body) = json(&failing, get("/v1/recipients")).await;
    assert_eq!(body["total"], 0);
    let (_, body) = json(&failing, get("/v1/selection")).await;
    assert_eq!(body["count"], 0);
}

// -- Selection ------------------------------------------------------------

#[tokio::test]
async fn toggle_twice_restores_selection() {
    let h = harness().await;
    let (status, body) = json(
        &h.state,
        post_json("/v1/selection/toggle", &serde_json::json!({ "id": ORCHARD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected"], true);

    let (_, body) = json(&h.state, get("/v1/selection")).await;
    assert_eq!(body["ids"], serde_json::json!([ORCHARD]));

    let (_, body) = json(
        &h.state,
        post_json("/v1/selection/toggle", &serde_json::json!({ "id": ORCHARD })),
    )
    .await;
    assert_eq!(body["selected"], false);
    let (_, body) = json(&h.state, get("/v1/selection")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn toggle_rejects_unknown_and_blank_ids() {
    let h = harness().await;
    let (status, _) = json(
        &h.state,
        post_json("/v1/selection/toggle", &serde_json::json!({ "id": "999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = json(
        &h.state,
        post_json("/v1/selection/toggle", &serde_json::json!({ "id": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn select_all_then_clear() {
    let h = harness().await;
    let (_, body) = json(&h.state, post_empty("/v1/selection/all")).await;
    assert_eq!(body["ids"], serde_json::json!([HARBOR, ORCHARD]));
    assert_eq!(body["count"], 2);

    let (status, body) = json(&h.state, delete("/v1/selection")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

// -- Attachments ----------------------------------------------------------

#[tokio::test]
async fn upload_is_hosted_for_the_provider() {
    let h = harness().await;
    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/v1/attachments?file_name=flyer%202024.pdf")
        .header(http::header::CONTENT_TYPE, "application/pdf")
        .body(Body::from("%PDF-1.4"))
        .unwrap();
    let (status, body) = json(&h.state, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["file_name"], "flyer 2024.pdf");
    assert_eq!(body["size_bytes"], 8);
    assert_eq!(body["content_type"], "application/pdf");

    let file_ref = body["file_ref"].as_str().unwrap();
    assert!(file_ref.starts_with("http://herald.test/files/"));
    assert!(file_ref.ends_with("/flyer%202024.pdf"));

    let path = file_ref.strip_prefix(PUBLIC_URL).unwrap();
    let app = herald_server::api::router(h.state.clone());
    let response = app.oneshot(get(path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "application/pdf"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4");
}

#[tokio::test]
async fn removed_upload_is_no_longer_served() {
    let h = harness().await;
    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/v1/attachments?file_name=a.txt")
        .body(Body::from("hello"))
        .unwrap();
    let (_, body) = json(&h.state, request).await;
    let id = body["id"].as_str().unwrap().to_owned();

    let (status, _) = json(&h.state, delete(&format!("/v1/attachments/{id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&h.state, get(&format!("/files/{id}/a.txt"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = json(&h.state, delete(&format!("/v1/attachments/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn url_attachment_limits() {
    let h = harness_with(
        static_directory(),
        MockTransport::default(),
        Duration::ZERO,
        AttachmentLimits {
            max_count: 1,
            max_size_bytes: 1024,
        },
    )
    .await;

    let (status, _) = json(
        &h.state,
        post_json(
            "/v1/attachments/url",
            &serde_json::json!({ "url": "ftp://files.example/a.pdf", "file_name": "a.pdf" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = json(
        &h.state,
        post_json(
            "/v1/attachments/url",
            &serde_json::json!({
                "url": "https://files.example/big.mp4",
                "file_name": "big.mp4",
                "size_bytes": 4096
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _) = json(
        &h.state,
        post_json(
            "/v1/attachments/url",
            &serde_json::json!({ "url": "https://files.example/a.pdf", "file_name": "a.pdf" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = json(
        &h.state,
        post_json(
            "/v1/attachments/url",
            &serde_json::json!({ "url": "https://files.example/b.pdf", "file_name": "b.pdf" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (_, body) = json(&h.state, get("/v1/attachments")).await;
    assert_eq!(body["attachments"].as_array().unwrap().len(), 1);
    assert_eq!(body["max_count"], 1);

    let (_, body) = json(&h.state, delete("/v1/attachments")).await;
    assert_eq!(body["removed"], 1);
}

// -- Dispatch -------------------------------------------------------------

#[tokio::test]
async fn dispatch_requires_message_and_selection() {
    let h = harness().await;
    let (status, body) = json(
        &h.state,
        post_json("/v1/dispatch", &serde_json::json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    json(&h.state, post_empty("/v1/selection/all")).await;
    let (status, _) = json(
        &h.state,
        post_json("/v1/dispatch", &serde_json::json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = json(&h.state, get("/v1/dispatch")).await;
    assert_eq!(body["state"], "idle");
    assert!(h.transport.texts.lock().is_empty());
}

#[tokio::test]
async fn dispatch_sends_to_selection_in_directory_order() {
    let h = harness().await;
    json(&h.state, post_empty("/v1/selection/all")).await;
    json(
        &h.state,
        post_json(
            "/v1/attachments/url",
            &serde_json::json!({ "url": "https://files.example/a.pdf", "file_name": "a.pdf" }),
        ),
    )
    .await;

    let (status, body) = json(
        &h.state,
        post_json("/v1/dispatch", &serde_json::json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "started");
    assert_eq!(body["total"], 2);

    let body = wait_for_state(&h.state, "completed").await;
    assert_eq!(body["last_summary"]["sent"], 2);
    assert_eq!(body["last_summary"]["errors"], 0);
    assert_eq!(body["last_summary"]["stopped"], false);
    assert_eq!(body["metrics"]["messages_sent"], 2);
    assert_eq!(body["metrics"]["attachments_sent"], 2);

    assert_eq!(
        *h.transport.texts.lock(),
        [format!("{HARBOR}@g.us"), format!("{ORCHARD}@g.us")]
    );
    assert_eq!(h.transport.files.lock().len(), 2);
}

#[tokio::test]
async fn uploaded_bytes_reach_the_transport() {
    let h = harness().await;
    json(&h.state, post_empty("/v1/selection/all")).await;
    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/v1/attachments?file_name=notes.txt")
        .header(http::header::CONTENT_TYPE, "text/plain")
        .body(Body::from("bring chairs"))
        .unwrap();
    let (status, body) = json(&h.state, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("content").is_none());

    json(
        &h.state,
        post_json("/v1/dispatch", &serde_json::json!({ "message": "hello" })),
    )
    .await;
    wait_for_state(&h.state, "completed").await;

    let contents = h.transport.file_contents.lock();
    assert_eq!(contents.len(), 2);
    assert!(
        contents
            .iter()
            .all(|c| c.as_deref() == Some(b"bring chairs".as_slice()))
    );
}

#[tokio::test]
async fn second_start_and_stop_while_running() {
    let h = harness_with(
        static_directory(),
        MockTransport::default(),
        Duration::from_secs(60),
        AttachmentLimits::default(),
    )
    .await;
    json(&h.state, post_empty("/v1/selection/all")).await;

    let message = serde_json::json!({ "message": "hello" });
    let (status, _) = json(&h.state, post_json("/v1/dispatch", &message)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, body) = json(&h.state, post_json("/v1/dispatch", &message)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "already_running");

    let (_, body) = json(&h.state, post_empty("/v1/dispatch/stop")).await;
    assert_eq!(body["stop_requested"], true);

    let body = wait_for_state(&h.state, "stopped").await;
    assert_eq!(body["last_summary"]["stopped"], true);
    assert!(body["last_summary"]["sent"].as_u64().unwrap() <= 1);
    assert!(h.transport.texts.lock().len() <= 1);
}

#[tokio::test]
async fn stop_when_idle_is_reported() {
    let h = harness().await;
    let (status, body) = json(&h.state, post_empty("/v1/dispatch/stop")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stop_requested"], false);
}

#[tokio::test]
async fn events_endpoint_is_an_event_stream() {
    let h = harness().await;
    let app = herald_server::api::router(h.state.clone());
    let response = app.oneshot(get("/v1/dispatch/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[http::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
}
