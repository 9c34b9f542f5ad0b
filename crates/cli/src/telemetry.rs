//! `tracing` subscriber wiring with optional OTLP span export.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{LogFormat, TelemetryConfig};

const SERVICE_NAME: &str = "interview-gateway";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter for {endpoint}: {message}")]
    Exporter { endpoint: String, message: String },

    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Keeps the span exporter alive; call [`TelemetryGuard::shutdown`] before
/// exit so buffered spans are flushed.
#[must_use]
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl TelemetryGuard {
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to flush spans: {e}");
            }
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so `invoke` output on
/// stdout stays machine-readable.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).boxed(),
    };

    let provider = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => Some(tracer_provider(endpoint)?),
        None => None,
    };
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))?;

    Ok(TelemetryGuard { provider })
}

fn tracer_provider(endpoint: &str) -> Result<TracerProvider, TelemetryError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)]))
        .build())
}
