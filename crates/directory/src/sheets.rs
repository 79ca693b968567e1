use std::time::Duration;

use async_trait::async_trait;
use herald_core::Recipient;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::error::DirectoryError;
use crate::gviz;
use crate::policy::DirectoryPolicy;
use crate::provider::DirectoryProvider;

/// Where a published Google Sheets tab lives.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Spreadsheet id from the sheet URL.
    pub sheet_id: String,
    /// Tab (sheet) name.
    pub tab_name: String,
    /// Base URL of the Docs host. Override this for testing.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Row filtering and ordering.
    pub policy: DirectoryPolicy,
}

impl SheetsConfig {
    /// Create a configuration for the given spreadsheet and tab.
    pub fn new(sheet_id: impl Into<String>, tab_name: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            tab_name: tab_name.into(),
            base_url: "https://docs.google.com".to_owned(),
            timeout: Duration::from_secs(15),
            policy: DirectoryPolicy::default(),
        }
    }

    /// Override the Docs base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Use a custom row policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DirectoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Directory provider that reads a published Google Sheets tab.
pub struct SheetsDirectory {
    config: SheetsConfig,
    client: Client,
}

impl SheetsDirectory {
    /// Create a new provider, building an HTTP client with the configured timeout.
    pub fn new(config: SheetsConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Create a new provider with a custom HTTP client.
    pub fn with_client(config: SheetsConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn request_error(&self, err: reqwest::Error) -> DirectoryError {
        if err.is_timeout() {
            DirectoryError::Timeout(self.config.timeout)
        } else {
            err.into()
        }
    }

    fn export_url(&self) -> String {
        format!(
            "{}/spreadsheets/d/{}/gviz/tq",
            self.config.base_url.trim_end_matches('/'),
            self.config.sheet_id
        )
    }
}

#[async_trait]
impl DirectoryProvider for SheetsDirectory {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "sheets"
    }

    #[instrument(skip(self), fields(sheet_id = %self.config.sheet_id, tab = %self.config.tab_name))]
    async fn fetch_recipients(&self) -> Result<Vec<Recipient>, DirectoryError> {
        debug!("fetching directory export");

        let response = self
            .client
            .get(self.export_url())
            .query(&[("tqx", "out:json"), ("sheet", self.config.tab_name.as_str())])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::SourceUnavailable(format!(
                "sheet export returned HTTP {status}"
            )));
        }

        let text = response.text().await.map_err(|e| self.request_error(e))?;
        let rows = gviz::extract_rows(
            &text,
            self.config.policy.name_column,
            self.config.policy.id_column,
        )?;
        let row_count = rows.len();
        let recipients = self.config.policy.build(rows);

        info!(
            rows = row_count,
            recipients = recipients.len(),
            "directory loaded"
        );

        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    /// Serve one canned HTTP response and return the request line.
    async fn serve_once(status_code: u16, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = stream.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).into_owned();
            let response = format!(
                "HTTP/1.1 {status_code} OK\r\n\
                 Content-Type: text/javascript; charset=utf-8\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request.lines().next().unwrap_or_default().to_owned()
        });
        (format!("http://127.0.0.1:{port}"), handle)
    }

    const BODY: &str = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","status":"ok","table":{"cols":[{},{},{},{}],"rows":[{"c":[null,{"v":"שם הקבוצה"},null,{"v":"מזהה"}]},{"c":[null,{"v":"Orchard"},null,{"v":"120363000000000002"}]},{"c":[null,{"v":"Harbor"},null,{"v":"120363000000000001"}]},{"c":[null,{"v":"Harbor"},null,{"v":"120363000000000001"}]}]}});"#;

    #[tokio::test]
    async fn fetches_and_builds_recipients() {
        let (base_url, handle) = serve_once(200, BODY).await;
        let dir =
            SheetsDirectory::new(SheetsConfig::new("sheet-123", "groups").with_base_url(base_url))
                .unwrap();

        let recipients = dir.fetch_recipients().await.unwrap();
        let request_line = handle.await.unwrap();

        assert!(request_line.starts_with("GET /spreadsheets/d/sheet-123/gviz/tq?"));
        assert!(request_line.contains("tqx=out%3Ajson"));
        assert!(request_line.contains("sheet=groups"));

        let names: Vec<_> = recipients.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, ["Harbor", "Orchard"]);
    }

    #[tokio::test]
    async fn http_error_is_source_unavailable() {
        let (base_url, handle) = serve_once(404, "not found").await;
        let dir = SheetsDirectory::new(SheetsConfig::new("missing", "groups").with_base_url(base_url))
            .unwrap();

        let err = dir.fetch_recipients().await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, DirectoryError::SourceUnavailable(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn unanswered_export_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = stream.read(&mut buf).await;
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(stream);
        });

        let config = SheetsConfig::new("slow", "groups")
            .with_base_url(format!("http://127.0.0.1:{port}"))
            .with_timeout(Duration::from_millis(200));
        let dir = SheetsDirectory::new(config).unwrap();

        let err = dir.fetch_recipients().await.unwrap_err();
        handle.abort();

        assert!(
            matches!(err, DirectoryError::Timeout(d) if d == Duration::from_millis(200)),
            "expected timeout, got {err:?}"
        );
    }

    #[tokio::test]
    async fn unparseable_body_is_source_unavailable() {
        let (base_url, handle) = serve_once(200, "<html>login</html>").await;
        let dir = SheetsDirectory::new(SheetsConfig::new("private", "groups").with_base_url(base_url))
            .unwrap();

        let err = dir.fetch_recipients().await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, DirectoryError::SourceUnavailable(_)));
    }
}
