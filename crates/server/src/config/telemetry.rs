use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// Logging and OpenTelemetry export.
///
/// `log_filter` applies when `RUST_LOG` is unset. With `enabled = true`,
/// spans for HTTP requests, directory loads and provider calls are exported
/// over OTLP as well.
///
/// ```toml
/// [telemetry]
/// log_filter = "info,herald_dispatch=debug"
/// enabled = true
/// endpoint = "http://localhost:4317"
/// protocol = "grpc"
/// ```
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default `tracing` filter directive.
    pub log_filter: String,
    /// Export spans over OTLP.
    pub enabled: bool,
    /// Collector endpoint.
    pub endpoint: String,
    /// Wire protocol for the collector.
    pub protocol: OtlpProtocol,
    /// `service.name` resource attribute.
    pub service_name: String,
    /// Fraction of traces kept, clamped to `0.0..=1.0`.
    pub sample_ratio: f64,
    /// Export timeout in seconds.
    pub timeout_seconds: u64,
    /// Extra resource attributes.
    pub resource_attributes: HashMap<String, String>,
}

/// OTLP transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    /// OTLP over gRPC (port 4317 by convention).
    #[default]
    Grpc,
    /// OTLP over HTTP/protobuf (port 4318 by convention).
    Http,
}

impl fmt::Display for OtlpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grpc => "grpc",
            Self::Http => "http",
        })
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_owned(),
            enabled: false,
            endpoint: "http://localhost:4317".to_owned(),
            protocol: OtlpProtocol::default(),
            service_name: "herald".to_owned(),
            sample_ratio: 1.0,
            timeout_seconds: 10,
            resource_attributes: HashMap::new(),
        }
    }
}
