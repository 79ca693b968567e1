use std::time::Duration;

use herald_core::AddressingPolicy;
use secrecy::SecretString;

/// Configuration for the Green-API transport.
#[derive(Clone)]
pub struct GreenApiConfig {
    /// Numeric instance identifier (the `waInstance{id}` path segment).
    pub instance_id: String,

    /// API token appended as the last path segment of every call.
    pub api_token: SecretString,

    /// Base URL of the Green-API host. Override this for testing against a
    /// mock server.
    pub api_base_url: String,

    /// Method name for text messages.
    pub send_text_method: String,

    /// Method name for sending a file by URL.
    pub send_file_method: String,

    /// Method name for uploading file bytes as multipart form data.
    pub upload_file_method: String,

    /// Upload files whose bytes are held locally instead of asking the
    /// provider to download them by URL.
    pub upload_files: bool,

    /// Method name for the instance state lookup used by health checks.
    pub state_method: String,

    /// Rules for turning directory identifiers into chat ids.
    pub addressing: AddressingPolicy,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for GreenApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreenApiConfig")
            .field("instance_id", &self.instance_id)
            .field("api_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("send_text_method", &self.send_text_method)
            .field("send_file_method", &self.send_file_method)
            .field("upload_file_method", &self.upload_file_method)
            .field("upload_files", &self.upload_files)
            .field("state_method", &self.state_method)
            .field("addressing", &self.addressing)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GreenApiConfig {
    /// Create a new configuration with the given instance id and API token.
    ///
    /// Uses the default Green-API base URL (`https://api.green-api.com`).
    pub fn new(instance_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            api_token: SecretString::new(api_token.into()),
            api_base_url: "https://api.green-api.com".to_owned(),
            send_text_method: "sendMessage".to_owned(),
            send_file_method: "sendFileByUrl".to_owned(),
            upload_file_method: "sendFileByUpload".to_owned(),
            upload_files: true,
            state_method: "getStateInstance".to_owned(),
            addressing: AddressingPolicy::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the API base URL (per-instance hosts, or a mock server).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the method names used for text, file and state calls.
    #[must_use]
    pub fn with_methods(
        mut self,
        send_text: impl Into<String>,
        send_file: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.send_text_method = send_text.into();
        self.send_file_method = send_file.into();
        self.state_method = state.into();
        self
    }

    /// Override the multipart upload method name.
    #[must_use]
    pub fn with_upload_method(mut self, method: impl Into<String>) -> Self {
        self.upload_file_method = method.into();
        self
    }

    /// Enable or disable multipart uploads. When disabled every file is sent
    /// by URL.
    #[must_use]
    pub fn with_file_upload(mut self, enabled: bool) -> Self {
        self.upload_files = enabled;
        self
    }

    /// Use a custom addressing policy.
    #[must_use]
    pub fn with_addressing(mut self, addressing: AddressingPolicy) -> Self {
        self.addressing = addressing;
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn defaults() {
        let config = GreenApiConfig::new("1101", "token");
        assert_eq!(config.api_base_url, "https://api.green-api.com");
        assert_eq!(config.instance_id, "1101");
        assert_eq!(config.api_token.expose_secret(), "token");
        assert_eq!(config.send_text_method, "sendMessage");
        assert_eq!(config.send_file_method, "sendFileByUrl");
        assert_eq!(config.state_method, "getStateInstance");
        assert_eq!(config.upload_file_method, "sendFileByUpload");
        assert!(config.upload_files);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn with_custom_api_base_url() {
        let config = GreenApiConfig::new("1101", "token").with_api_base_url("http://localhost:9999");
        assert_eq!(config.api_base_url, "http://localhost:9999");
    }

    #[test]
    fn with_custom_methods() {
        let config = GreenApiConfig::new("1101", "token").with_methods("a", "b", "c");
        assert_eq!(config.send_text_method, "a");
        assert_eq!(config.send_file_method, "b");
        assert_eq!(config.state_method, "c");
    }

    #[test]
    fn upload_can_be_disabled() {
        let config = GreenApiConfig::new("1101", "token")
            .with_upload_method("uploadFile")
            .with_file_upload(false);
        assert_eq!(config.upload_file_method, "uploadFile");
        assert!(!config.upload_files);
    }

    #[test]
    fn debug_redacts_api_token() {
        let config = GreenApiConfig::new("1101", "test-placeholder-value");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"), "api_token must be redacted");
        assert!(
            !debug.contains("test-placeholder-value"),
            "api_token must not appear in debug output"
        );
        assert!(debug.contains("1101"), "instance_id should still be visible");
    }
}
