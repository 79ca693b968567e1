use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Environment variable that overrides `provider.api_token`.
pub const API_TOKEN_ENV: &str = "HERALD_API_TOKEN";

/// Messaging provider configuration.
///
/// # Example
///
/// ```toml
/// [provider]
/// type = "greenapi"
/// instance_id = "1101000001"
/// api_base_url = "https://7103.api.greenapi.com"
/// ```
///
/// The token is best supplied through `HERALD_API_TOKEN` rather than the
/// file.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: `"greenapi"` or `"log"` (logs sends, contacts nobody).
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,
    /// Green-API instance id.
    #[serde(default)]
    pub instance_id: String,
    /// Green-API token.
    #[serde(default)]
    pub api_token: Option<SecretString>,
    /// API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Method used to send text.
    #[serde(default = "default_send_text_method")]
    pub send_text_method: String,
    /// Method used to send a file by URL.
    #[serde(default = "default_send_file_method")]
    pub send_file_method: String,
    /// Method used to upload file bytes as multipart form data.
    #[serde(default = "default_upload_file_method")]
    pub upload_file_method: String,
    /// Upload staged files directly instead of sending their public URL.
    /// Disable only when `server.public_url` is reachable by the provider.
    #[serde(default = "default_upload_files")]
    pub upload_files: bool,
    /// Method used for the account health check.
    #[serde(default = "default_state_method")]
    pub state_method: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            instance_id: String::new(),
            api_token: None,
            api_base_url: default_api_base_url(),
            send_text_method: default_send_text_method(),
            send_file_method: default_send_file_method(),
            upload_file_method: default_upload_file_method(),
            upload_files: default_upload_files(),
            state_method: default_state_method(),
            timeout_seconds: default_provider_timeout(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the API token, preferring a non-empty `HERALD_API_TOKEN`.
    pub fn resolve_token(&self) -> Option<SecretString> {
        resolve_token(std::env::var(API_TOKEN_ENV).ok(), self.api_token.as_ref())
    }
}

fn resolve_token(env: Option<String>, file: Option<&SecretString>) -> Option<SecretString> {
    env.filter(|t| !t.trim().is_empty())
        .map(SecretString::new)
        .or_else(|| {
            file.filter(|t| !t.expose_secret().trim().is_empty())
                .map(|t| SecretString::new(t.expose_secret().clone()))
        })
}

fn default_provider_type() -> String {
    "log".to_owned()
}

fn default_api_base_url() -> String {
    "https://api.green-api.com".to_owned()
}

fn default_send_text_method() -> String {
    "sendMessage".to_owned()
}

fn default_send_file_method() -> String {
    "sendFileByUrl".to_owned()
}

fn default_upload_file_method() -> String {
    "sendFileByUpload".to_owned()
}

fn default_upload_files() -> bool {
    true
}

fn default_state_method() -> String {
    "getStateInstance".to_owned()
}

fn default_provider_timeout() -> u64 {
    30
}
