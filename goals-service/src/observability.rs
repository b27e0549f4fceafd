//! Tracing and access log setup

use std::fs;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::filter_fn, fmt, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::{
    config::{AccessLogConfig, Config},
    error::{Error, Result},
    middleware::ACCESS_LOG_TARGET,
};

/// Initialize tracing
///
/// Application events go to stdout as JSON, filtered by `service.log_level`.
/// Access log lines go only to the access log file. Keep the returned guard
/// alive for the life of the process; dropping it flushes the file.
pub fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
    let log_level = &config.service.log_level;

    let stdout_layer = fmt::layer()
        .json()
        .with_filter(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_filter(filter_fn(|metadata| metadata.target() != ACCESS_LOG_TARGET));

    let (file_layer, guard) = match access_log_layer(&config.access_log)? {
        Some((layer, guard)) => (Some(layer), Some(guard)),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal(format!("failed to initialize tracing: {}", e)))?;

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(guard)
}

/// Layer appending access log lines to the configured file
///
/// Returns `None` when the access log is disabled. Creates the log directory
/// if needed. The file is appended to and never rotated.
pub fn access_log_layer<S>(
    config: &AccessLogConfig,
) -> Result<Option<(Box<dyn Layer<S> + Send + Sync + 'static>, WorkerGuard)>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if !config.enabled {
        return Ok(None);
    }

    fs::create_dir_all(&config.directory)?;

    let appender = tracing_appender::rolling::never(&config.directory, &config.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(filter_fn(|metadata| metadata.target() == ACCESS_LOG_TARGET))
        .boxed();

    Ok(Some((layer, guard)))
}
