//! Exported version state for the monitored target.
//!
//! Each target carries exactly one active indicator: either the
//! `temporal_server_version_info{address,version}` series or the
//! `temporal_server_version_unknown{address}` series. Moving between
//! indicators is computed by [`transition`]. Both families are gathered
//! through one collector that read-locks the state `publish` write-locks, so
//! a scrape observes either the state before a publish or the state after
//! it, while concurrent scrapes proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use clap::ValueEnum;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGaugeVec, Opts, Registry};
use tracing::{debug, warn};

use crate::error::Result;
use crate::probe::{ProbeResult, Target};

pub const VERSION_INFO_METRIC: &str = "temporal_server_version_info";
pub const VERSION_UNKNOWN_METRIC: &str = "temporal_server_version_unknown";

pub mod labels {
    pub const ADDRESS: &str = "address";
    pub const VERSION: &str = "version";
}

/// What happens to a series once it stops being the active indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StaleSeriesPolicy {
    /// Delete the series from the exposition
    #[default]
    Remove,
    /// Keep the series visible with value 0
    Zero,
}

/// Classification last published for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    Version(String),
    Unknown,
}

impl From<&ProbeResult> for Indicator {
    fn from(result: &ProbeResult) -> Self {
        match result {
            ProbeResult::VersionFound(v) => Indicator::Version(v.clone()),
            ProbeResult::VersionUnknown | ProbeResult::TransportError(_) => Indicator::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    pub retract: Option<Indicator>,
    pub activate: Option<Indicator>,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.retract.is_none() && self.activate.is_none()
    }
}

/// Compute the series changes needed to move from `previous` to `next`.
pub fn transition(previous: Option<&Indicator>, next: &Indicator) -> Transition {
    match previous {
        Some(prev) if prev == next => Transition::default(),
        Some(prev) => Transition {
            retract: Some(prev.clone()),
            activate: Some(next.clone()),
        },
        None => Transition {
            retract: None,
            activate: Some(next.clone()),
        },
    }
}

type Published = Arc<RwLock<HashMap<Target, Indicator>>>;

fn read(published: &Published) -> RwLockReadGuard<'_, HashMap<Target, Indicator>> {
    published
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(published: &Published) -> RwLockWriteGuard<'_, HashMap<Target, Indicator>> {
    published
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owner of the two exported gauge families
pub struct VersionState {
    info: IntGaugeVec,
    unknown: IntGaugeVec,
    policy: StaleSeriesPolicy,
    published: Published,
}

/// Registry-facing view gathering both families under a read lock
struct SnapshotCollector {
    info: IntGaugeVec,
    unknown: IntGaugeVec,
    published: Published,
}

impl Collector for SnapshotCollector {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.info.desc();
        descs.extend(self.unknown.desc());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let _guard = read(&self.published);
        let mut families = self.info.collect();
        families.extend(self.unknown.collect());
        families
    }
}

impl VersionState {
    /// Create both gauge families and register them on `registry`
    pub fn register(registry: &Registry, policy: StaleSeriesPolicy) -> Result<Self> {
        let info = IntGaugeVec::new(
            Opts::new(
                VERSION_INFO_METRIC,
                "Temporal server version as a label (value will be 1). Label 'version' has the textual server version.",
            ),
            &[labels::ADDRESS, labels::VERSION],
        )?;
        let unknown = IntGaugeVec::new(
            Opts::new(
                VERSION_UNKNOWN_METRIC,
                "Set to 1 if exporter could not determine version.",
            ),
            &[labels::ADDRESS],
        )?;

        let published: Published = Arc::new(RwLock::new(HashMap::new()));
        registry.register(Box::new(SnapshotCollector {
            info: info.clone(),
            unknown: unknown.clone(),
            published: published.clone(),
        }))?;

        Ok(Self {
            info,
            unknown,
            policy,
            published,
        })
    }

    /// Last classification published for `target`
    pub fn current(&self, target: &Target) -> Option<Indicator> {
        read(&self.published).get(target).cloned()
    }

    /// Reconcile the exported series with the outcome of a probe cycle.
    pub fn publish(&self, target: &Target, result: &ProbeResult) {
        let next = Indicator::from(result);

        // held across retract and activate; collect() read-locks the same map
        let mut published = write(&self.published);

        let step = transition(published.get(target), &next);
        if step.is_noop() {
            return;
        }

        if let Some(stale) = &step.retract {
            debug!(%target, indicator = ?stale, policy = ?self.policy, "retracting stale series");
            self.retract(target, stale);
        }
        if let Some(active) = &step.activate {
            self.activate(target, active);
        }

        published.insert(target.clone(), next);
    }

    fn activate(&self, target: &Target, indicator: &Indicator) {
        match indicator {
            Indicator::Version(v) => self
                .info
                .with_label_values(&[target.as_str(), v.as_str()])
                .set(1),
            Indicator::Unknown => self.unknown.with_label_values(&[target.as_str()]).set(1),
        }
    }

    fn retract(&self, target: &Target, indicator: &Indicator) {
        let (vec, values): (&IntGaugeVec, Vec<&str>) = match indicator {
            Indicator::Version(v) => (&self.info, vec![target.as_str(), v.as_str()]),
            Indicator::Unknown => (&self.unknown, vec![target.as_str()]),
        };

        match self.policy {
            StaleSeriesPolicy::Remove => {
                if let Err(e) = vec.remove_label_values(&values[..]) {
                    warn!(%target, error = %e, "failed to remove stale series");
                }
            }
            StaleSeriesPolicy::Zero => vec.with_label_values(&values[..]).set(0),
        }
    }
}
