//! Simulated control plane shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use temporal_version_exporter_lib::probe::Target;
use temporal_version_exporter_lib::{Connector, ControlPlane, ProbeError};
use tonic::{Code, Status};

pub type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// How one simulated RPC answers
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(Code),
    Hang,
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }

    async fn respond(&self) -> Result<String, Status> {
        match self {
            Reply::Text(t) => Ok(t.clone()),
            Reply::Fail(code) => Err(Status::new(*code, "simulated failure")),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Status::deadline_exceeded("hung call returned"))
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct CallLog {
    pub connects: AtomicUsize,
    pub system_info: AtomicUsize,
    pub cluster_info: AtomicUsize,
    pub released: AtomicUsize,
}

impl CallLog {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
    pub fn system_info(&self) -> usize {
        self.system_info.load(Ordering::SeqCst)
    }
    pub fn cluster_info(&self) -> usize {
        self.cluster_info.load(Ordering::SeqCst)
    }
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
enum Dial {
    Ok,
    Refused,
    Hang,
}

/// Connector whose replies can be changed between probe cycles
#[derive(Debug, Clone)]
pub struct FakeConnector {
    dial: Dial,
    system: Arc<Mutex<Reply>>,
    cluster: Arc<Mutex<Reply>>,
    pub calls: Arc<CallLog>,
}

impl FakeConnector {
    pub fn new(system: Reply, cluster: Reply) -> Self {
        Self {
            dial: Dial::Ok,
            system: Arc::new(Mutex::new(system)),
            cluster: Arc::new(Mutex::new(cluster)),
            calls: Arc::new(CallLog::default()),
        }
    }

    pub fn refusing() -> Self {
        Self {
            dial: Dial::Refused,
            ..Self::new(Reply::text("server_version: 1.0.0"), Reply::text(""))
        }
    }

    pub fn hanging_dial() -> Self {
        Self {
            dial: Dial::Hang,
            ..Self::new(Reply::text("server_version: 1.0.0"), Reply::text(""))
        }
    }

    pub fn set_system(&self, reply: Reply) {
        *self.system.lock().unwrap_or_else(|p| p.into_inner()) = reply;
    }

    pub fn set_cluster(&self, reply: Reply) {
        *self.cluster.lock().unwrap_or_else(|p| p.into_inner()) = reply;
    }

    fn snapshot(&self) -> (Reply, Reply) {
        let system = self.system.lock().unwrap_or_else(|p| p.into_inner()).clone();
        let cluster = self.cluster.lock().unwrap_or_else(|p| p.into_inner()).clone();
        (system, cluster)
    }
}

impl Connector for FakeConnector {
    type Client = FakeClient;

    async fn connect(&self, target: &Target) -> Result<FakeClient, ProbeError> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        match self.dial {
            Dial::Ok => {}
            Dial::Refused => {
                return Err(ProbeError::Connect {
                    target: target.to_string(),
                    reason: "connection refused".to_string(),
                })
            }
            Dial::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }

        let (system, cluster) = self.snapshot();
        Ok(FakeClient {
            system,
            cluster,
            calls: self.calls.clone(),
        })
    }
}

pub struct FakeClient {
    system: Reply,
    cluster: Reply,
    calls: Arc<CallLog>,
}

impl ControlPlane for FakeClient {
    async fn system_info(&mut self) -> Result<String, Status> {
        self.calls.system_info.fetch_add(1, Ordering::SeqCst);
        self.system.respond().await
    }

    async fn cluster_info(&mut self) -> Result<String, Status> {
        self.calls.cluster_info.fetch_add(1, Ordering::SeqCst);
        self.cluster.respond().await
    }
}

impl Drop for FakeClient {
    fn drop(&mut self) {
        self.calls.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Value of an exact series line (`name{labels}`) in a text exposition
pub fn sample(exposition: &str, series: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (name, value) = line.rsplit_once(' ')?;
            if name == series {
                value.parse().ok()
            } else {
                None
            }
        })
}

pub fn version_series(address: &str, version: &str) -> String {
    format!(r#"temporal_server_version_info{{address="{address}",version="{version}"}}"#)
}

pub fn unknown_series(address: &str) -> String {
    format!(r#"temporal_server_version_unknown{{address="{address}"}}"#)
}

/// Number of active (value 1) version series for `address`
pub fn active_versions(exposition: &str, address: &str) -> usize {
    let prefix = format!(r#"temporal_server_version_info{{address="{address}","#);
    exposition
        .lines()
        .filter(|line| line.starts_with(&prefix))
        .filter(|line| line.ends_with(" 1"))
        .count()
}
