//! Periodic probe scheduling.
//!
//! Cycles run strictly one after another: probe, publish, log, sleep. A
//! failed cycle is logged and forgotten; the next one starts from scratch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::probe::{Connector, ProbeResult, Prober};
use crate::telemetry::{Metrics, VersionState};

pub struct RefreshLoop<C> {
    prober: Prober<C>,
    state: Arc<VersionState>,
    metrics: Option<Arc<Metrics>>,
    interval: Duration,
}

impl<C: Connector> RefreshLoop<C> {
    pub fn new(prober: Prober<C>, state: Arc<VersionState>, interval: Duration) -> Self {
        Self {
            prober,
            state,
            metrics: None,
            interval,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run a single probe cycle and publish its outcome.
    pub async fn run_once(&self) -> ProbeResult {
        let target = self.prober.target();
        let started = Instant::now();
        let result = self.prober.probe().await;
        let elapsed = started.elapsed();

        self.state.publish(target, &result);

        match &result {
            ProbeResult::VersionFound(version) => {
                info!(%version, address = %target, "detected temporal version");
            }
            ProbeResult::VersionUnknown => {
                warn!(address = %target, "version not found in responses");
            }
            ProbeResult::TransportError(e) => {
                warn!(address = %target, error = %e, kind = e.kind(), "refresh error");
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_probe(result.outcome(), elapsed);
            if let ProbeResult::TransportError(e) = &result {
                metrics.record_probe_error(e.kind());
            }
        }

        result
    }

    /// Probe every `interval` until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            address = %self.prober.target(),
            interval = ?self.interval,
            deadline = ?self.prober.deadline(),
            "refresh loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = self.run_once() => {}
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
            debug!("refresh interval elapsed");
        }

        info!("refresh loop stopped");
    }
}
