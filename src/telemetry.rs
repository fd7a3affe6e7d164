//! Logging and metrics collaborators
//!
//! The pipeline only talks to the [`Logger`] and [`Metrics`] traits. The
//! production implementations forward to `tracing` and to an OpenTelemetry
//! meter; [`init`] wires the subscriber and, when enabled, OTLP export.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Mutex;

use opentelemetry::{InstrumentationScope, global};
use opentelemetry::metrics::{Counter, Meter};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{MetricExporter, SpanExporter};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LoggingConfig, TelemetryConfig};
use crate::error::ProxyError;

/// Structured log sink
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    fn verbose(&self, message: &str);
}

/// Counter sink
pub trait Metrics: Send + Sync {
    fn uptick(&self, counter_name: &str);
}

/// [`Logger`] backed by `tracing`; `verbose` maps to debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn verbose(&self, message: &str) {
        tracing::debug!("{}", message);
    }
}

/// [`Metrics`] backed by the global OpenTelemetry meter provider
pub struct OtelMetrics {
    meter: Meter,
    counters: Mutex<HashMap<String, Counter<u64>>>,
}

impl OtelMetrics {
    #[must_use]
    pub fn new(scope: impl Into<Cow<'static, str>>) -> Self {
        Self {
            meter: global::meter_with_scope(InstrumentationScope::builder(scope).build()),
            counters: Mutex::new(HashMap::new()),
        }
    }
}

impl Metrics for OtelMetrics {
    fn uptick(&self, counter_name: &str) {
        let mut counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters
            .entry(counter_name.to_string())
            .or_insert_with(|| self.meter.u64_counter(counter_name.to_string()).build())
            .add(1, &[]);
    }
}

/// Keeps the OTLP providers alive; call [`Telemetry::shutdown`] before exit
#[derive(Default)]
pub struct Telemetry {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl Telemetry {
    /// Flush and stop exporters
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!("Failed to shut down tracer provider: {}", e);
            }
        }
        if let Some(provider) = self.meter_provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!("Failed to shut down meter provider: {}", e);
            }
        }
    }
}

/// Install the global tracing subscriber and optional OTLP exporters.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(logging: &LoggingConfig, telemetry: &TelemetryConfig) -> Result<Telemetry, ProxyError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let fmt_layer = match logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().boxed(),
        _ => tracing_subscriber::fmt::layer().pretty().boxed(),
    };

    let mut handles = Telemetry::default();
    let otel_layer = if telemetry.otlp_enabled {
        let resource = Resource::builder()
            .with_service_name(telemetry.service_name.clone())
            .build();

        let span_exporter = SpanExporter::builder()
            .with_http()
            .build()
            .map_err(|e| ProxyError::telemetry(format!("span exporter: {e}")))?;
        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(span_exporter)
            .with_resource(resource.clone())
            .build();

        let metric_exporter = MetricExporter::builder()
            .with_http()
            .build()
            .map_err(|e| ProxyError::telemetry(format!("metric exporter: {e}")))?;
        let meter_provider = SdkMeterProvider::builder()
            .with_periodic_exporter(metric_exporter)
            .with_resource(resource)
            .build();
        global::set_meter_provider(meter_provider.clone());

        let tracer = tracer_provider.tracer(telemetry.service_name.clone());
        handles.tracer_provider = Some(tracer_provider);
        handles.meter_provider = Some(meter_provider);
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter)
        .try_init()
        .map_err(|e| ProxyError::telemetry(e.to_string()))?;

    Ok(handles)
}

#[cfg(any(test, feature = "test-util"))]
pub use recording::{LogLevel, RecordingLogger, RecordingMetrics};

/// Test doubles, compiled for tests and the `test-util` feature only
#[cfg(any(test, feature = "test-util"))]
mod recording {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::{Logger, Metrics};

    /// In-memory [`Logger`] that records every message with its level
    #[derive(Debug, Default)]
    pub struct RecordingLogger {
        entries: Mutex<Vec<(LogLevel, String)>>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LogLevel {
        Info,
        Error,
        Verbose,
    }

    impl RecordingLogger {
        #[must_use]
        pub fn entries(&self) -> Vec<(LogLevel, String)> {
            self.entries.lock().map(|e| e.clone()).unwrap_or_default()
        }

        #[must_use]
        pub fn messages(&self, level: LogLevel) -> Vec<String> {
            self.entries()
                .into_iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m)
                .collect()
        }

        fn push(&self, level: LogLevel, message: &str) {
            if let Ok(mut entries) = self.entries.lock() {
                entries.push((level, message.to_string()));
            }
        }
    }

    impl Logger for RecordingLogger {
        fn info(&self, message: &str) {
            self.push(LogLevel::Info, message);
        }

        fn error(&self, message: &str) {
            self.push(LogLevel::Error, message);
        }

        fn verbose(&self, message: &str) {
            self.push(LogLevel::Verbose, message);
        }
    }

    /// In-memory [`Metrics`] counting upticks per counter name
    #[derive(Debug, Default)]
    pub struct RecordingMetrics {
        counts: Mutex<HashMap<String, u64>>,
    }

    impl RecordingMetrics {
        #[must_use]
        pub fn count(&self, counter_name: &str) -> u64 {
            self.counts
                .lock()
                .ok()
                .and_then(|c| c.get(counter_name).copied())
                .unwrap_or(0)
        }
    }

    impl Metrics for RecordingMetrics {
        fn uptick(&self, counter_name: &str) {
            if let Ok(mut counts) = self.counts.lock() {
                *counts.entry(counter_name.to_string()).or_default() += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_logger_keeps_levels() {
        let logger = RecordingLogger::default();
        logger.info("one");
        logger.verbose("two");
        logger.error("three");
        assert_eq!(logger.messages(LogLevel::Error), vec!["three".to_string()]);
        assert_eq!(logger.entries().len(), 3);
    }

    #[test]
    fn test_recording_metrics_counts() {
        let metrics = RecordingMetrics::default();
        metrics.uptick("a");
        metrics.uptick("a");
        metrics.uptick("b");
        assert_eq!(metrics.count("a"), 2);
        assert_eq!(metrics.count("b"), 1);
        assert_eq!(metrics.count("c"), 0);
    }

    #[test]
    fn test_otel_metrics_without_provider_is_noop() {
        let config = crate::config::TelemetryConfig::default();
        let metrics = OtelMetrics::new(config.service_name.clone());
        metrics.uptick("forecast.fetch.success");
        metrics.uptick("forecast.fetch.success");
        assert_eq!(metrics.counters.lock().unwrap().len(), 1);
    }
}
