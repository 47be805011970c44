#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod probe;
pub mod refresh;
pub mod telemetry;

pub use config::{Cli, Config};
pub use error::{ExporterError, ProbeError, Result};
pub use probe::{
    extract_version, looks_like_semver, Connector, ControlPlane, GrpcConnector, ProbeResult,
    Prober, Target,
};
pub use refresh::RefreshLoop;
pub use telemetry::{Indicator, StaleSeriesPolicy, VersionState};
