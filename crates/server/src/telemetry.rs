//! Process-wide `tracing` setup.
//!
//! Installs an `EnvFilter` + `fmt` subscriber, plus an OpenTelemetry layer
//! when OTLP export is enabled and the exporter can be built.

use std::time::Duration;

use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{BatchSpanProcessor, Sampler, SdkTracerProvider};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{OtlpProtocol, TelemetryConfig};

/// Keeps the tracer provider alive. Call [`shutdown`](Self::shutdown) before
/// exit to flush buffered spans.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Flush and close the span exporter, if one was installed.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider
            && let Err(e) = provider.shutdown()
        {
            tracing::warn!(error = %e, "tracer provider shutdown failed");
        }
    }
}

/// Install the global subscriber.
///
/// An exporter that fails to build is logged and tracing continues with
/// console output only.
pub fn init(config: &TelemetryConfig) -> TelemetryGuard {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (provider, export_error) = if config.enabled {
        match tracer_provider(config) {
            Ok(provider) => (Some(provider), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("herald")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    if let Some(e) = export_error {
        tracing::error!(
            error = %e,
            endpoint = %config.endpoint,
            protocol = %config.protocol,
            "OTLP exporter unavailable, logging to console only"
        );
    } else if provider.is_some() {
        tracing::info!(
            endpoint = %config.endpoint,
            protocol = %config.protocol,
            sample_ratio = config.sample_ratio,
            "OTLP span export enabled"
        );
    }

    TelemetryGuard { provider }
}

fn tracer_provider(
    config: &TelemetryConfig,
) -> Result<SdkTracerProvider, opentelemetry::trace::TraceError> {
    let timeout = Duration::from_secs(config.timeout_seconds);
    let exporter = match config.protocol {
        OtlpProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&config.endpoint)
            .with_timeout(timeout)
            .build()?,
        OtlpProtocol::Http => SpanExporter::builder()
            .with_http()
            .with_endpoint(&config.endpoint)
            .with_timeout(timeout)
            .build()?,
    };

    let provider = SdkTracerProvider::builder()
        .with_span_processor(BatchSpanProcessor::builder(exporter).build())
        .with_sampler(sampler(config.sample_ratio))
        .with_resource(resource(config))
        .build();
    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

fn resource(config: &TelemetryConfig) -> Resource {
    let base = [
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ];
    let extra = config
        .resource_attributes
        .iter()
        .map(|(k, v)| KeyValue::new(k.clone(), v.clone()));
    Resource::builder().with_attributes(base.into_iter().chain(extra)).build()
}

fn sampler(ratio: f64) -> Sampler {
    match ratio {
        r if r >= 1.0 => Sampler::AlwaysOn,
        r if r <= 0.0 => Sampler::AlwaysOff,
        r => Sampler::TraceIdRatioBased(r),
    }
}
