use std::sync::Arc;
use std::time::Duration;

use herald_directory::{DirectoryProvider, SheetsConfig, SheetsDirectory, StaticDirectory};

use crate::config::DirectoryConfig;
use crate::error::ServerError;

/// Create the recipient directory from the given configuration.
pub fn create_directory(
    config: &DirectoryConfig,
) -> Result<Arc<dyn DirectoryProvider>, ServerError> {
    let directory: Arc<dyn DirectoryProvider> = match config.directory_type.as_str() {
        "static" => Arc::new(
            StaticDirectory::new(
                config
                    .entries
                    .iter()
                    .map(|e| (e.name.clone(), e.id.clone())),
            )
            .with_policy(config.policy.clone()),
        ),
        "sheets" => {
            if config.sheet_id.trim().is_empty() {
                return Err(ServerError::Config(
                    "sheets directory requires [directory] sheet_id".into(),
                ));
            }
            let sheets = SheetsConfig::new(config.sheet_id.trim(), &config.tab_name)
                .with_base_url(&config.base_url)
                .with_timeout(Duration::from_secs(config.timeout_seconds))
                .with_policy(config.policy.clone());
            Arc::new(SheetsDirectory::new(sheets)?)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unknown directory type: {other:?} (expected \"sheets\" or \"static\")"
            )));
        }
    };
    Ok(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticEntry;

    #[tokio::test]
    async fn static_directory_from_entries() {
        let config = DirectoryConfig {
            entries: vec![
                StaticEntry {
                    name: "Orchard".into(),
                    id: Some("120363000000000002".into()),
                },
                StaticEntry {
                    name: "Harbor".into(),
                    id: None,
                },
            ],
            ..DirectoryConfig::default()
        };
        let directory = create_directory(&config).unwrap();
        assert_eq!(directory.name(), "static");
        let recipients = directory.fetch_recipients().await.unwrap();
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].display_name, "Harbor");
    }

    #[test]
    fn sheets_requires_sheet_id() {
        let config = DirectoryConfig {
            directory_type: "sheets".into(),
            ..DirectoryConfig::default()
        };
        let err = create_directory(&config).err().unwrap();
        assert!(err.to_string().contains("sheet_id"));
    }

    #[test]
    fn unknown_directory_type() {
        let config = DirectoryConfig {
            directory_type: "ldap".into(),
            ..DirectoryConfig::default()
        };
        assert!(matches!(
            create_directory(&config),
            Err(ServerError::Config(_))
        ));
    }
}
