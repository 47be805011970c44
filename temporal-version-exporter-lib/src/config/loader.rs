use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use tracing::warn;

use crate::config::cli::{Cli, DEFAULT_PROBE_TIMEOUT, DEFAULT_SCRAPE_INTERVAL};
use crate::config::duration::parse_duration;
use crate::config::Config;
use crate::error::{ExporterError, Result};
use crate::probe::Target;

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if cli.temporal_addr.trim().is_empty() {
            return Err(ExporterError::Config(
                "temporal address must not be empty".to_string(),
            ));
        }

        Ok(Self {
            target: Target::new(cli.temporal_addr.trim()),
            listen: parse_listen_addr(&cli.listen_addr)?,
            scrape_interval: duration_or_default(
                "scrape-interval",
                &cli.scrape_interval,
                DEFAULT_SCRAPE_INTERVAL,
            ),
            probe_timeout: duration_or_default(
                "probe-timeout",
                &cli.probe_timeout,
                DEFAULT_PROBE_TIMEOUT,
            ),
            stale_series: cli.stale_series,
            log_level: cli.log_level,
        })
    }
}

/// Parse a listen address; a bare `:port` means every interface.
pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr> {
    let raw = raw.trim();
    let normalized = match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => raw.to_string(),
    };

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    normalized
        .to_socket_addrs()
        .map_err(|e| ExporterError::Config(format!("Invalid listen address {raw:?}: {e}")))?
        .next()
        .ok_or_else(|| ExporterError::Config(format!("Listen address {raw:?} resolved to nothing")))
}

/// Parse `raw`, falling back to `default` when it is malformed or zero.
pub fn duration_or_default(name: &str, raw: &str, default: &str) -> Duration {
    match parse_duration(raw) {
        Some(d) if !d.is_zero() => d,
        _ => {
            let fallback = parse_duration(default).unwrap_or(Duration::from_secs(30));
            warn!(setting = name, value = raw, ?fallback, "invalid duration, using default");
            fallback
        }
    }
}
