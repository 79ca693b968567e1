mod attachments;
mod directory;
mod dispatch;
mod provider;
mod server;
mod telemetry;


pub use attachments::*;
pub use directory::*;
pub use dispatch::*;
pub use provider::*;
pub use server::*;
pub use telemetry::*;

use std::path::Path;

use herald_core::AddressingPolicy;
use serde::Deserialize;

use crate::error::ServerError;

/// Top-level configuration for the Herald server, loaded from a TOML file.
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct HeraldConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Static UI bundle configuration.
    #[serde(default)]
    pub ui: UiConfig,
    /// Messaging provider configuration.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Identifier normalization rules.
    #[serde(default)]
    pub addressing: AddressingPolicy,
    /// Recipient directory source.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Dispatch pacing and event buffering.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Staged attachment limits.
    #[serde(default)]
    pub attachments: AttachmentConfig,
    /// OpenTelemetry distributed tracing configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl HeraldConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Load the configuration at `path`, or the defaults when it does not exist.
    ///
    /// Returns the configuration and whether the file was found.
    pub fn load(path: &Path) -> Result<(Self, bool), ServerError> {
        if !path.exists() {
            return Ok((Self::default(), false));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok((Self::from_toml(&contents)?, true))
    }

    /// Whether the provider will be asked to download hosted files from a
    /// URL it cannot reach.
    pub fn hosted_files_unreachable(&self) -> bool {
        self.provider.provider_type == "greenapi"
            && !self.provider.upload_files
            && self.server.public_url_is_local()
    }
}
