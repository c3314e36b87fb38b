use std::{sync::OnceLock, time::Instant};

use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

use domain_radar_util::{AppConfig, Environment};

const DEFAULT_FILTER: &str = "info,tower_http=info,sqlx=warn";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to initialize tracing: {0}")]
    Tracing(#[from] TryInitError),
}

struct Metrics {
    handle: PrometheusHandle,
    started: Instant,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Installs the global subscriber: pretty output outside production, JSON lines in production.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let base = fmt::layer()
        .with_target(false)
        .with_timer(UtcTime::rfc_3339());
    let output = match config.environment {
        Environment::Production => base.json().boxed(),
        Environment::Development | Environment::Test => base.pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()?;

    tracing::info!(stage = "telemetry", env = %config.environment.as_str(), version = VERSION, "tracing initialized");
    Ok(())
}

/// Returns the process-wide Prometheus handle, installing the recorder on first use.
pub fn init_metrics() -> PrometheusHandle {
    METRICS
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(err) = metrics::set_global_recorder(recorder) {
                warn!(stage = "telemetry", error = %err, "metrics recorder already installed");
            }

            describe_gauge!("app_build_info", "Build metadata for the running binary");
            describe_gauge!("app_uptime_seconds", "Seconds since the process started");
            describe_counter!(
                "domain_checks_total",
                "Count of availability checks served, labelled by the reported availability"
            );
            describe_counter!(
                "platform_seed_inserted_total",
                "Count of default platforms inserted by startup seeding"
            );
            gauge!("app_build_info", "version" => VERSION).set(1.0);

            Metrics {
                handle,
                started: Instant::now(),
            }
        })
        .handle
        .clone()
}

/// Refreshes the uptime gauge and renders the exposition text.
pub fn render_metrics(handle: &PrometheusHandle) -> String {
    let uptime = METRICS
        .get()
        .map(|metrics| metrics.started.elapsed().as_secs_f64())
        .unwrap_or_default();
    gauge!("app_uptime_seconds").set(uptime);
    handle.render()
}
