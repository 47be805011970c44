use std::net::SocketAddr;
use std::time::Duration;

use crate::probe::Target;
use crate::telemetry::StaleSeriesPolicy;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend to probe (host:port)
    pub target: Target,
    /// Address the scrape endpoint binds to
    pub listen: SocketAddr,
    /// Sleep between the end of one probe cycle and the start of the next
    pub scrape_interval: Duration,
    /// Deadline for one probe cycle
    pub probe_timeout: Duration,
    pub stale_series: StaleSeriesPolicy,
    pub log_level: String,
}
