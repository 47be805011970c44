pub mod client;
pub mod extractor;
pub mod temporal;

use std::fmt;

use crate::error::ProbeError;

pub use client::{Connector, ControlPlane, Prober};
pub use extractor::{extract_version, looks_like_semver};
pub use temporal::{GrpcConnector, WorkflowServiceClient};

/// Address (host:port) of the monitored frontend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(String);

impl Target {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URI handed to the gRPC transport; `http://` is prepended when the
    /// address carries no scheme
    pub fn endpoint_uri(&self) -> String {
        if self.0.contains("://") {
            self.0.clone()
        } else {
            format!("http://{}", self.0)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one probe cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    VersionFound(String),
    /// At least one RPC answered but no version token was recognized
    VersionUnknown,
    TransportError(ProbeError),
}

impl ProbeResult {
    pub fn from_extraction(version: Option<String>) -> Self {
        match version {
            Some(v) => ProbeResult::VersionFound(v),
            None => ProbeResult::VersionUnknown,
        }
    }

    /// Label used for the `outcome` dimension of the probe counter
    pub fn outcome(&self) -> &'static str {
        match self {
            ProbeResult::VersionFound(_) => "found",
            ProbeResult::VersionUnknown => "unknown",
            ProbeResult::TransportError(_) => "error",
        }
    }
}
