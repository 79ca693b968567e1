use herald_core::{Ack, Attachment, ChatId, RecipientId};
use herald_transport::{Transport, TransportError};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::GreenApiConfig;
use crate::error::GreenApiError;
use crate::types::{SendFileByUrlRequest, SendMessageRequest, SendResponse, StateInstanceResponse};

/// Green-API transport that sends WhatsApp messages and files.
///
/// Implements the [`Transport`] trait so the dispatch controller can use it
/// behind `Arc<dyn DynTransport>`.
pub struct GreenApiTransport {
    config: GreenApiConfig,
    client: Client,
}

impl GreenApiTransport {
    /// Create a new Green-API transport with the given configuration.
    ///
    /// Builds a `reqwest::Client` using the configured request timeout.
    pub fn new(config: GreenApiConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Create a new Green-API transport with a custom HTTP client.
    ///
    /// Useful for testing or for sharing a connection pool.
    pub fn with_client(config: GreenApiConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Build the URL for a Green-API method.
    ///
    /// The result embeds the API token and must never be logged.
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/waInstance{}/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.instance_id,
            method,
            self.config.api_token.expose_secret()
        )
    }

    /// Classify a failed request. The URL is stripped because it embeds the
    /// API token.
    fn request_error(&self, err: reqwest::Error) -> GreenApiError {
        if err.is_timeout() {
            GreenApiError::Timeout(self.config.timeout)
        } else {
            GreenApiError::Http(err.without_url())
        }
    }

    /// POST a JSON body to a send method and interpret the response.
    async fn post_send<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<Ack, GreenApiError> {
        let request = self.client.post(self.method_url(method)).json(body);
        self.execute_send(method, request).await
    }

    /// POST the file bytes as multipart form data.
    async fn post_upload(
        &self,
        chat: &ChatId,
        caption: &str,
        file: &Attachment,
        content: &[u8],
    ) -> Result<Ack, GreenApiError> {
        let plain_part = || Part::bytes(content.to_vec()).file_name(file.file_name.clone());
        // An unparseable MIME type is dropped rather than failing the send.
        let part = match file.content_type.as_deref() {
            Some(mime) => plain_part().mime_str(mime).unwrap_or_else(|_| plain_part()),
            None => plain_part(),
        };

        let mut form = Form::new().text("chatId", chat.to_string());
        if !caption.is_empty() {
            form = form.text("caption", caption.to_owned());
        }
        let form = form.part("file", part);

        let method = self.config.upload_file_method.as_str();
        let request = self.client.post(self.method_url(method)).multipart(form);
        self.execute_send(method, request).await
    }

    async fn execute_send(
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> Result<Ack, GreenApiError> {
        let response = request.send().await.map_err(|e| self.request_error(e))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(method, "Green-API rate limit hit");
            return Err(GreenApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GreenApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx with an unreadable body still means the request was accepted.
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<SendResponse>(&text) {
            Ok(SendResponse {
                id_message: Some(id),
            }) => Ok(Ack::with_id(id)),
            Ok(_) => Ok(Ack::opaque()),
            Err(e) => {
                debug!(method, error = %e, "accepted with opaque response body");
                Ok(Ack::opaque())
            }
        }
    }
}

impl Transport for GreenApiTransport {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "greenapi"
    }

    fn normalize_recipient(&self, id: &RecipientId) -> Result<ChatId, TransportError> {
        Ok(self.config.addressing.normalize(id)?)
    }

    #[instrument(skip(self, body), fields(transport = "greenapi", chat_id = %chat))]
    async fn send_text(&self, chat: &ChatId, body: &str) -> Result<Ack, TransportError> {
        let request = SendMessageRequest {
            chat_id: chat.to_string(),
            message: body.to_owned(),
        };

        debug!("sending text via Green-API");

        let ack = self
            .post_send(&self.config.send_text_method, &request)
            .await?;
        Ok(ack)
    }

    #[instrument(
        skip(self, caption, file),
        fields(transport = "greenapi", chat_id = %chat, file_name = %file.file_name)
    )]
    async fn send_file(
        &self,
        chat: &ChatId,
        caption: &str,
        file: &Attachment,
    ) -> Result<Ack, TransportError> {
        if self.config.upload_files
            && let Some(content) = &file.content
        {
            debug!(bytes = content.len(), "uploading file via Green-API");
            let ack = self.post_upload(chat, caption, file, content).await?;
            return Ok(ack);
        }

        let request = SendFileByUrlRequest {
            chat_id: chat.to_string(),
            url_file: file.file_ref.clone(),
            file_name: file.file_name.clone(),
            caption: caption.to_owned(),
        };

        debug!("sending file by URL via Green-API");

        let ack = self
            .post_send(&self.config.send_file_method, &request)
            .await?;
        Ok(ack)
    }

    #[instrument(skip(self), fields(transport = "greenapi"))]
    async fn health_check(&self) -> Result<(), TransportError> {
        debug!("performing Green-API health check via instance state");

        let response = self
            .client
            .get(self.method_url(&self.config.state_method))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GreenApiError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let state: StateInstanceResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Serialization(e.to_string()))?;

        if state.state_instance != "authorized" {
            return Err(GreenApiError::NotAuthorized(state.state_instance).into());
        }

        debug!("Green-API health check passed");

        Ok(())
    }
}
