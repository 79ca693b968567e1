use std::sync::Arc;
use std::time::Duration;

use herald_core::AddressingPolicy;
use herald_greenapi::{GreenApiConfig, GreenApiTransport};
use herald_transport::{DynTransport, LogTransport};
use secrecy::ExposeSecret;

use crate::config::ProviderConfig;
use crate::error::ServerError;

/// Create the messaging transport from the given configuration.
///
/// `api_token` is the already-resolved token (environment or file).
pub fn create_transport(
    config: &ProviderConfig,
    addressing: &AddressingPolicy,
    api_token: Option<&secrecy::SecretString>,
) -> Result<Arc<dyn DynTransport>, ServerError> {
    let transport: Arc<dyn DynTransport> = match config.provider_type.as_str() {
        "log" => Arc::new(LogTransport::new("log").with_policy(addressing.clone())),
        "greenapi" => {
            if config.instance_id.trim().is_empty() {
                return Err(ServerError::Config(
                    "greenapi provider requires [provider] instance_id".into(),
                ));
            }
            let token = api_token.ok_or_else(|| {
                ServerError::Config(format!(
                    "greenapi provider requires [provider] api_token or {}",
                    crate::config::API_TOKEN_ENV
                ))
            })?;

            let gc = GreenApiConfig::new(config.instance_id.trim(), token.expose_secret().clone())
                .with_api_base_url(&config.api_base_url)
                .with_methods(
                    &config.send_text_method,
                    &config.send_file_method,
                    &config.state_method,
                )
                .with_upload_method(&config.upload_file_method)
                .with_file_upload(config.upload_files)
                .with_addressing(addressing.clone())
                .with_timeout(Duration::from_secs(config.timeout_seconds));

            Arc::new(GreenApiTransport::new(gc)?)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unknown provider type: {other:?} (expected \"greenapi\" or \"log\")"
            )));
        }
    };
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn log_provider_needs_no_token() {
        let config = ProviderConfig::default();
        let transport = create_transport(&config, &AddressingPolicy::default(), None).unwrap();
        assert_eq!(transport.name(), "log");
    }

    #[test]
    fn greenapi_requires_instance_and_token() {
        let mut config = ProviderConfig {
            provider_type: "greenapi".into(),
            ..ProviderConfig::default()
        };
        let err = create_transport(&config, &AddressingPolicy::default(), None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("instance_id"));

        config.instance_id = "1101000001".into();
        let err = create_transport(&config, &AddressingPolicy::default(), None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("HERALD_API_TOKEN"));

        let token = SecretString::new("token".into());
        let transport =
            create_transport(&config, &AddressingPolicy::default(), Some(&token)).unwrap();
        assert_eq!(transport.name(), "greenapi");
    }

    #[test]
    fn unknown_provider_type() {
        let config = ProviderConfig {
            provider_type: "carrier-pigeon".into(),
            ..ProviderConfig::default()
        };
        let err = create_transport(&config, &AddressingPolicy::default(), None)
            .err()
            .unwrap();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
