use crate::config::{LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "agentic=info,learn_client=info";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("could not build statsd recorder: {0}")]
    Statsd(#[from] metrics_exporter_statsd::StatsdError),
    #[error("could not install metrics recorder: {0}")]
    Recorder(String),
}

/// Installs the tracing subscriber. The returned guard flushes Sentry on drop
/// and must be held for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.level.as_deref().unwrap_or(DEFAULT_FILTER))
    });

    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });
    let sentry_layer = guard
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_layer)
        .init();

    guard
}

/// Sends metrics to StatsD. Without a metrics section every metric is a no-op.
pub fn init_metrics(config: Option<&MetricsConfig>) -> Result<(), TelemetryError> {
    let Some(config) = config else {
        return Ok(());
    };

    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some(config.prefix.as_str()))?;
    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::Recorder(e.to_string()))?;
    shared::metrics_defs::describe_all(learn_client::metrics_defs::ALL_METRICS);

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "statsd metrics enabled"
    );
    Ok(())
}
