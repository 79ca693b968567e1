use herald_directory::DirectoryPolicy;
use serde::Deserialize;

/// Recipient directory source.
///
/// # Example
///
/// ```toml
/// [directory]
/// type = "sheets"
/// sheet_id = "1AbC..."
/// tab_name = "groups"
/// exclude_markers = ["general", "all groups"]
/// ```
#[derive(Debug, Deserialize)]
pub struct DirectoryConfig {
    /// Source type: `"sheets"` (published Google Sheets tab) or `"static"`.
    #[serde(rename = "type", default = "default_directory_type")]
    pub directory_type: String,
    /// Spreadsheet id (sheets source).
    #[serde(default)]
    pub sheet_id: String,
    /// Tab name (sheets source).
    #[serde(default = "default_tab_name")]
    pub tab_name: String,
    /// Docs host base URL (sheets source).
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    /// Fetch timeout in seconds (sheets source).
    #[serde(default = "default_directory_timeout")]
    pub timeout_seconds: u64,
    /// Fixed recipient list (static source).
    #[serde(default)]
    pub entries: Vec<StaticEntry>,
    /// Column layout and row filtering.
    #[serde(flatten)]
    pub policy: DirectoryPolicy,
}

/// One row of a static directory.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticEntry {
    /// Display name.
    pub name: String,
    /// Provider identifier; omit to list the recipient without one.
    #[serde(default)]
    pub id: Option<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            directory_type: default_directory_type(),
            sheet_id: String::new(),
            tab_name: default_tab_name(),
            base_url: default_sheets_base_url(),
            timeout_seconds: default_directory_timeout(),
            entries: Vec::new(),
            policy: DirectoryPolicy::default(),
        }
    }
}

fn default_directory_type() -> String {
    "static".to_owned()
}

fn default_tab_name() -> String {
    "Sheet1".to_owned()
}

fn default_sheets_base_url() -> String {
    "https://docs.google.com".to_owned()
}

fn default_directory_timeout() -> u64 {
    15
}
