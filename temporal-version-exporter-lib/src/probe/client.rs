use std::future::Future;
use std::time::Duration;

use tonic::Status;
use tracing::debug;

use crate::error::ProbeError;
use crate::probe::extractor::extract_version;
use crate::probe::{ProbeResult, Target};

/// Connected handle to the control plane.
///
/// Both calls return the textual dump of the response; the handle is dropped
/// (and the connection closed) when the probe finishes.
pub trait ControlPlane: Send {
    fn system_info(&mut self) -> impl Future<Output = Result<String, Status>> + Send;
    fn cluster_info(&mut self) -> impl Future<Output = Result<String, Status>> + Send;
}

/// Opens a [`ControlPlane`] connection to a target
pub trait Connector: Send + Sync {
    type Client: ControlPlane;

    fn connect(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Self::Client, ProbeError>> + Send;
}

/// Two-tier version probe against a single target
#[derive(Debug, Clone)]
pub struct Prober<C> {
    connector: C,
    target: Target,
    deadline: Duration,
}

impl<C: Connector> Prober<C> {
    pub fn new(connector: C, target: Target, deadline: Duration) -> Self {
        Self {
            connector,
            target,
            deadline,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run one probe under a fresh deadline.
    ///
    /// GetSystemInfo is asked first; GetClusterInfo only when that call
    /// failed or carried no recognizable version. An elapsed deadline
    /// abandons whatever is in flight.
    pub async fn probe(&self) -> ProbeResult {
        match tokio::time::timeout(self.deadline, self.probe_within_deadline()).await {
            Ok(result) => result,
            Err(_) => ProbeResult::TransportError(ProbeError::DeadlineExceeded(self.deadline)),
        }
    }

    async fn probe_within_deadline(&self) -> ProbeResult {
        let mut client = match self.connector.connect(&self.target).await {
            Ok(client) => client,
            Err(e) => return ProbeResult::TransportError(e),
        };

        let system_info_error = match client.system_info().await {
            Ok(text) => {
                if let Some(version) = extract_version(&text) {
                    return ProbeResult::VersionFound(version);
                }
                debug!(target = %self.target, "no version in GetSystemInfo response");
                None
            }
            Err(status) => {
                debug!(target = %self.target, error = %status.message(), "GetSystemInfo failed");
                Some(status)
            }
        };

        match client.cluster_info().await {
            Ok(text) => ProbeResult::from_extraction(extract_version(&text)),
            Err(status) => match system_info_error {
                Some(first) => ProbeResult::TransportError(ProbeError::Rpc {
                    system_info: describe(&first),
                    cluster_info: describe(&status),
                }),
                None => {
                    debug!(target = %self.target, error = %status.message(), "GetClusterInfo failed");
                    ProbeResult::VersionUnknown
                }
            },
        }
    }
}

fn describe(status: &Status) -> String {
    format!("{:?}: {}", status.code(), status.message())
}
