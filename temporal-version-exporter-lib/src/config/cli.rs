use clap::Parser;

use crate::telemetry::StaleSeriesPolicy;

pub const DEFAULT_TEMPORAL_ADDR: &str = "127.0.0.1:7236";
pub const DEFAULT_LISTEN_ADDR: &str = ":9090";
pub const DEFAULT_SCRAPE_INTERVAL: &str = "30s";
pub const DEFAULT_PROBE_TIMEOUT: &str = "10s";

/// Command line surface; every flag can also come from its environment
/// variable, with the flag winning when both are set.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "temporal-version-exporter",
    author,
    version,
    about = "Exports the Temporal server version as a Prometheus gauge"
)]
pub struct Cli {
    /// Temporal frontend gRPC address
    #[arg(long, env = "TEMPORAL_ADDR", default_value = DEFAULT_TEMPORAL_ADDR)]
    pub temporal_addr: String,

    /// Metrics listen address (":9090" listens on all interfaces)
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// How often to refresh the version (e.g. "30s", "1m30s")
    #[arg(long, env = "SCRAPE_INTERVAL", default_value = DEFAULT_SCRAPE_INTERVAL)]
    pub scrape_interval: String,

    /// Deadline covering the dial and both RPCs of one probe
    #[arg(long, env = "PROBE_TIMEOUT", default_value = DEFAULT_PROBE_TIMEOUT)]
    pub probe_timeout: String,

    /// What to do with a series that is no longer active
    #[arg(long, env = "STALE_SERIES", value_enum, default_value_t = StaleSeriesPolicy::Remove)]
    pub stale_series: StaleSeriesPolicy,

    /// Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}
