use serde::{Deserialize, Serialize};

/// JSON body for the `sendMessage` method.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Fully qualified chat id (`...@g.us` or `...@s.whatsapp.net`).
    pub chat_id: String,

    /// Message text.
    pub message: String,
}

/// JSON body for the `sendFileByUrl` method.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFileByUrlRequest {
    /// Fully qualified chat id.
    pub chat_id: String,

    /// URL Green-API downloads the file from.
    pub url_file: String,

    /// File name shown to recipients.
    pub file_name: String,

    /// Caption sent with the file. Empty strings are omitted.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caption: String,
}

/// Response from the send methods.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    /// Identifier of the queued message.
    pub id_message: Option<String>,
}

/// Response from `getStateInstance`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateInstanceResponse {
    /// Instance state, e.g. `"authorized"` or `"notAuthorized"`.
    pub state_instance: String,
}
