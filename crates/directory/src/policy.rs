use std::collections::HashSet;

use herald_core::{Recipient, RecipientId};
use icu_collator::{Collator, CollatorOptions};
use icu_locid::Locale;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A row extracted from a tabular source before filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Display name cell, if present.
    pub name: Option<String>,
    /// Identifier cell, if present.
    pub id: Option<String>,
}

impl RawRow {
    /// Convenience constructor.
    pub fn new(name: Option<&str>, id: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_owned),
            id: id.map(str::to_owned),
        }
    }
}

/// How directory rows are turned into recipients.
///
/// Rows without a name are dropped. Rows whose name equals a header sentinel
/// or contains an exclusion marker (both case-insensitive) are dropped. Rows
/// without an identifier are kept with `recipient_id: None`. Duplicates are
/// removed by identifier, or by name when there is no identifier; the first
/// occurrence wins. The result is sorted by display name using the collation
/// rules of `collation_locale`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryPolicy {
    /// Zero-based column holding the display name.
    #[serde(default = "default_name_column")]
    pub name_column: usize,
    /// Zero-based column holding the identifier.
    #[serde(default = "default_id_column")]
    pub id_column: usize,
    /// Names that mark a header row.
    #[serde(default = "default_header_sentinels")]
    pub header_sentinels: Vec<String>,
    /// Substrings that mark an "everyone"/general row.
    #[serde(default = "default_exclude_markers")]
    pub exclude_markers: Vec<String>,
    /// BCP 47 locale whose collation orders the names (`"und"` is the root
    /// collation).
    #[serde(default = "default_collation_locale")]
    pub collation_locale: String,
}

impl Default for DirectoryPolicy {
    fn default() -> Self {
        Self {
            name_column: default_name_column(),
            id_column: default_id_column(),
            header_sentinels: default_header_sentinels(),
            exclude_markers: default_exclude_markers(),
            collation_locale: default_collation_locale(),
        }
    }
}

fn default_name_column() -> usize {
    1
}

fn default_id_column() -> usize {
    3
}

fn default_header_sentinels() -> Vec<String> {
    vec!["שם הקבוצה".to_owned(), "name".to_owned()]
}

fn default_exclude_markers() -> Vec<String> {
    vec!["כללי".to_owned(), "general".to_owned(), "all groups".to_owned()]
}

fn default_collation_locale() -> String {
    "und".to_owned()
}

#[derive(PartialEq, Eq, Hash)]
enum DedupKey {
    Id(RecipientId),
    Name(String),
}

impl DirectoryPolicy {
    /// Apply the policy to raw rows.
    pub fn build(&self, rows: impl IntoIterator<Item = RawRow>) -> Vec<Recipient> {
        let sentinels: Vec<String> = self
            .header_sentinels
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        let markers: Vec<String> = self
            .exclude_markers
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let mut seen = HashSet::new();
        let mut recipients = Vec::new();

        for row in rows {
            let Some(name) = row.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
                continue;
            };
            let lowered = name.to_lowercase();
            if sentinels.iter().any(|s| *s == lowered) {
                debug!(name, "skipping header row");
                continue;
            }
            if markers.iter().any(|m| lowered.contains(m.as_str())) {
                debug!(name, "skipping general row");
                continue;
            }

            let recipient_id = row.id.as_deref().and_then(RecipientId::new);
            if recipient_id.is_none() {
                warn!(name, "directory row has no identifier");
            }

            let key = match &recipient_id {
                Some(id) => DedupKey::Id(id.clone()),
                None => DedupKey::Name(name.to_owned()),
            };
            if !seen.insert(key) {
                debug!(name, "skipping duplicate row");
                continue;
            }

            recipients.push(Recipient {
                display_name: name.to_owned(),
                recipient_id,
            });
        }

        self.sort(&mut recipients);
        recipients
    }

    fn collator(&self) -> Option<Collator> {
        let locale: Locale = match self.collation_locale.trim().parse() {
            Ok(locale) => locale,
            Err(e) => {
                warn!(locale = %self.collation_locale, error = %e, "invalid collation locale");
                return None;
            }
        };
        match Collator::try_new(&locale.into(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!(locale = %self.collation_locale, error = %e, "collator unavailable");
                None
            }
        }
    }

    /// Order by collation, raw text breaking ties. Without a collator, falls
    /// back to lowercased code-point order.
    fn sort(&self, recipients: &mut [Recipient]) {
        if let Some(collator) = self.collator() {
            recipients.sort_by(|a, b| {
                collator
                    .compare(&a.display_name, &b.display_name)
                    .then_with(|| a.display_name.cmp(&b.display_name))
            });
        } else {
            recipients
                .sort_by_cached_key(|r| (r.display_name.to_lowercase(), r.display_name.clone()));
        }
    }
}
