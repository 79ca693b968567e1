use std::net::IpAddr;

use serde::Deserialize;

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Graceful shutdown timeout in seconds.
    ///
    /// Upper bound on the wait for an active broadcast to observe the stop
    /// request and finish its in-flight send.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
    /// Externally reachable base URL of this server (e.g.
    /// `https://herald.example.com`).
    ///
    /// Uploaded attachments are handed to the provider as
    /// `{public_url}/files/{id}/{name}`, so the provider must be able to
    /// reach it unless the provider uploads file bytes directly. Defaults to
    /// `http://{host}:{port}`.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// The base URL used for hosted attachment links.
    pub fn public_url(&self) -> String {
        self.public_url.as_deref().map_or_else(
            || format!("http://{}:{}", self.host, self.port),
            |url| url.trim_end_matches('/').to_owned(),
        )
    }

    /// Whether [`public_url`](Self::public_url) points at this machine only
    /// (loopback, unspecified or `localhost`), so no remote provider can
    /// fetch hosted files from it.
    pub fn public_url_is_local(&self) -> bool {
        let url = self.public_url();
        let authority = url
            .split_once("://")
            .map_or(url.as_str(), |(_, rest)| rest)
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
        let host = match host.strip_prefix('[') {
            Some(bracketed) => bracketed.split(']').next().unwrap_or_default(),
            None => host.split(':').next().unwrap_or_default(),
        };

        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }
        host.parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback() || ip.is_unspecified())
    }
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

/// Static UI bundle configuration.
#[derive(Debug, Deserialize)]
pub struct UiConfig {
    /// Whether to serve the operator page.
    #[serde(default)]
    pub enabled: bool,
    /// Directory containing the built page. Defaults to `"ui/dist"`.
    #[serde(default = "default_ui_dist")]
    pub dist_path: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dist_path: default_ui_dist(),
        }
    }
}

fn default_ui_dist() -> String {
    "ui/dist".to_owned()
}
