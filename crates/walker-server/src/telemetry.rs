//! Logging and OpenTelemetry instrumentation.

use anyhow::Result;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_sdk::{
    trace::{Config, RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walker_core::ServerConfig;

const DEFAULT_FILTER: &str = "info,walker_server=debug,walker_world=debug";

pub fn init_telemetry(config: &ServerConfig) -> Result<()> {
    // Spans are only sampled when an endpoint is configured
    let sampler = if config.otel_endpoint.is_some() {
        Sampler::AlwaysOn
    } else {
        Sampler::AlwaysOff
    };

    let tracer_provider = TracerProvider::builder()
        .with_config(
            Config::default()
                .with_sampler(sampler)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new(SERVICE_NAME, "walker-server"),
                    KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build();

    global::set_tracer_provider(tracer_provider.clone());

    let telemetry_layer =
        tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("walker-server"));

    let json_layer = config
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().with_target(true));
    let text_layer = (!config.json_logs).then(|| tracing_subscriber::fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(json_layer)
        .with(text_layer)
        .with(telemetry_layer)
        .init();

    match config.otel_endpoint.as_deref() {
        Some(endpoint) => info!("OpenTelemetry enabled with endpoint: {}", endpoint),
        None => info!("OpenTelemetry disabled (no endpoint configured)"),
    }
    Ok(())
}

pub fn shutdown_telemetry() {
    info!("Shutting down telemetry");
    global::shutdown_tracer_provider();
}

/// Record a gauge metric
#[macro_export]
macro_rules! record_gauge {
    ($name:expr, $value:expr) => {
        tracing::info!(
            gauge_name = $name,
            gauge_value = $value,
            "Gauge metric"
        );
    };
    ($name:expr, $value:expr, $($key:ident => $val:expr),*) => {
        tracing::info!(
            gauge_name = $name,
            gauge_value = $value,
            $($key = $val,)*
            "Gauge metric"
        );
    };
}
