use anyhow::Result;
use once_cell::sync::OnceCell;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::{Compression, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    trace::{SdkTracerProvider, Tracer},
    Resource,
};
use std::{env::var, time::Duration};
use tonic::transport::ClientTlsConfig;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use ulid::Ulid;

const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

fn normalize_endpoint(ep: &str) -> String {
    let ep = ep.trim().trim_end_matches('/');
    if ep.starts_with("http://") || ep.starts_with("https://") {
        ep.to_string()
    } else {
        format!("https://{ep}")
    }
}

/// Host part of an `https://` endpoint, used as the TLS domain name.
fn tls_domain(endpoint: &str) -> Option<&str> {
    endpoint
        .strip_prefix("https://")
        .and_then(|rest| rest.split('/').next())
        .and_then(|authority| authority.split(':').next())
        .filter(|host| !host.is_empty())
}

fn init_tracer(endpoint: &str) -> Result<Tracer> {
    let endpoint = normalize_endpoint(endpoint);

    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .with_compression(Compression::Gzip)
        .with_timeout(Duration::from_secs(3));

    if let Some(host) = tls_domain(&endpoint) {
        let tls = ClientTlsConfig::new()
            .domain_name(host.to_string())
            .with_native_roots();
        builder = builder.with_tls_config(tls);
    }

    let exporter = builder.build()?;

    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder_empty()
                .with_attributes(vec![
                    KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                    KeyValue::new("service.instance.id", instance_id),
                ])
                .build(),
        )
        .build();

    let _ = TRACER_PROVIDER.set(trace_provider.clone());

    global::set_tracer_provider(trace_provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());

    Ok(trace_provider.tracer(env!("CARGO_PKG_NAME")))
}

/// Initialize logging and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, the OTLP
/// span exporter (gRPC).
///
/// # Errors
///
/// Returns an error if tracer or subscriber initialization fails
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let verbosity_level = verbosity_level.unwrap_or(Level::ERROR);

    let fmt_layer = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // RUST_LOG overrides the verbosity default.
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    if let Ok(endpoint) = var(OTLP_ENDPOINT_ENV) {
        let tracer = init_tracer(&endpoint)?;
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        let subscriber = Registry::default()
            .with(fmt_layer)
            .with(otel_layer)
            .with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(fmt_layer).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Flush and shut down the tracer provider (noop if not initialized)
pub fn shutdown_tracer() {
    if let Some(tp) = TRACER_PROVIDER.get() {
        debug!("shutting down tracer provider");
        let _ = tp.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_endpoint_keeps_scheme() {
        assert_eq!(
            normalize_endpoint("http://localhost:4317"),
            "http://localhost:4317"
        );
        assert_eq!(
            normalize_endpoint("https://otel.example.com:4317/"),
            "https://otel.example.com:4317"
        );
    }

    #[test]
    fn normalize_endpoint_defaults_to_https() {
        assert_eq!(
            normalize_endpoint(" otel.example.com:4317 "),
            "https://otel.example.com:4317"
        );
    }

    #[test]
    fn tls_domain_only_for_https() {
        assert_eq!(
            tls_domain("https://otel.example.com:4317/v1/traces"),
            Some("otel.example.com")
        );
        assert_eq!(tls_domain("http://localhost:4317"), None);
        assert_eq!(tls_domain("https://"), None);
    }

    #[test]
    fn shutdown_tracer_without_provider() {
        shutdown_tracer();
    }
}
