use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in the exporter outside of a probe cycle
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to bind metrics endpoint on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<prometheus::Error> for ExporterError {
    fn from(e: prometheus::Error) -> Self {
        ExporterError::Metrics(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;

/// Why a probe cycle could not reach the control plane
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("invalid target address {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("grpc dial {target}: {reason}")]
    Connect { target: String, reason: String },

    #[error("GetSystemInfo failed ({system_info}); GetClusterInfo failed ({cluster_info})")]
    Rpc {
        system_info: String,
        cluster_info: String,
    },

    #[error("probe deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl ProbeError {
    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::InvalidTarget { .. } => "invalid_target",
            ProbeError::Connect { .. } => "connect",
            ProbeError::Rpc { .. } => "rpc",
            ProbeError::DeadlineExceeded(_) => "deadline",
        }
    }
}
