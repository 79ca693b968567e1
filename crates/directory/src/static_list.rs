use async_trait::async_trait;
use herald_core::Recipient;

use crate::error::DirectoryError;
use crate::policy::{DirectoryPolicy, RawRow};
use crate::provider::DirectoryProvider;

/// A directory backed by a fixed list, filtered through a [`DirectoryPolicy`].
///
/// Useful for local development and for deployments whose group list rarely
/// changes.
pub struct StaticDirectory {
    rows: Vec<RawRow>,
    policy: DirectoryPolicy,
}

impl StaticDirectory {
    /// Create a directory from `(name, id)` pairs.
    pub fn new<N, I>(entries: impl IntoIterator<Item = (N, Option<I>)>) -> Self
    where
        N: Into<String>,
        I: Into<String>,
    {
        let rows = entries
            .into_iter()
            .map(|(name, id)| RawRow {
                name: Some(name.into()),
                id: id.map(Into::into),
            })
            .collect();
        Self {
            rows,
            policy: DirectoryPolicy::default(),
        }
    }

    /// Use a custom policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DirectoryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl DirectoryProvider for StaticDirectory {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_recipients(&self) -> Result<Vec<Recipient>, DirectoryError> {
        Ok(self.policy.build(self.rows.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_directory_applies_policy() {
        let dir = StaticDirectory::new([
            ("Orchard", Some("120363000000000002")),
            ("Harbor", Some("120363000000000001")),
            ("General", Some("120363000000000003")),
            ("Hill", None),
        ]);
        let recipients = dir.fetch_recipients().await.unwrap();
        let names: Vec<_> = recipients.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, ["Harbor", "Hill", "Orchard"]);
        assert!(recipients[1].recipient_id.is_none());
    }
}
