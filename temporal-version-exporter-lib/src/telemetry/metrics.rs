use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ExporterError, Result};

pub mod labels {
    pub const OUTCOME: &str = "outcome";
    pub const ERROR_TYPE: &str = "error_type";
    pub const VERSION: &str = "version";
    pub const RUST_VERSION: &str = "rust_version";
}

// counters get their `_total` suffix from the prometheus exporter

/// Bucket bounds sized for a probe deadline of a few seconds
pub const PROBE_DURATION_BOUNDARIES: [f64; 9] = [0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Self-metrics describing the exporter's own probe activity
#[derive(Clone)]
pub struct Metrics {
    pub probes_total: Counter<u64>,
    pub probe_errors_total: Counter<u64>,
    pub probe_duration_seconds: Histogram<f64>,

    // Build info
    pub build_info: Gauge<u64>,
}

impl Metrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            probes_total: meter
                .u64_counter("temporal_version_exporter_probes")
                .with_description("Total number of probe cycles by outcome")
                .build(),
            probe_errors_total: meter
                .u64_counter("temporal_version_exporter_probe_errors")
                .with_description("Total number of probe cycles that failed to reach the frontend")
                .build(),
            probe_duration_seconds: meter
                .f64_histogram("temporal_version_exporter_probe_duration_seconds")
                .with_description("Probe cycle duration in seconds")
                .with_boundaries(PROBE_DURATION_BOUNDARIES.to_vec())
                .build(),

            build_info: meter
                .u64_gauge("temporal_version_exporter_build_info")
                .with_description("Build information (value is always 1)")
                .build(),
        }
    }

    pub fn set_build_info(&self) {
        let version = env!("CARGO_PKG_VERSION");
        let rust_version = env!("CARGO_PKG_RUST_VERSION");

        self.build_info.record(
            1,
            &[
                KeyValue::new(labels::VERSION, version),
                KeyValue::new(labels::RUST_VERSION, rust_version),
            ],
        );
    }

    pub fn record_probe(&self, outcome: &'static str, duration: Duration) {
        self.probes_total
            .add(1, &[KeyValue::new(labels::OUTCOME, outcome)]);
        self.probe_duration_seconds
            .record(duration.as_secs_f64(), &[KeyValue::new(labels::OUTCOME, outcome)]);
    }

    pub fn record_probe_error(&self, error_type: &'static str) {
        self.probe_errors_total
            .add(1, &[KeyValue::new(labels::ERROR_TYPE, error_type)]);
    }
}

/// Build the prometheus registry shared by the scrape endpoint and wire the
/// OpenTelemetry meter provider into it.
pub fn init_metrics() -> Result<(Arc<Metrics>, Registry)> {
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()
        .map_err(|e| ExporterError::Metrics(format!("Failed to build prometheus exporter: {e}")))?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("temporal-version-exporter");
    let metrics = Arc::new(Metrics::new(&meter));

    metrics.set_build_info();

    Ok((metrics, registry))
}
