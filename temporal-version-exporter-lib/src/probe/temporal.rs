//! Minimal client for the two informational WorkflowService RPCs.
//!
//! Messages are declared by hand with only the fields worth printing;
//! fields unknown to these declarations are skipped while decoding.

use std::collections::HashMap;
use std::error::Error as StdError;

use http::uri::PathAndQuery;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;
use tracing::debug;

use crate::error::ProbeError;
use crate::probe::client::{Connector, ControlPlane};
use crate::probe::Target;

const GET_SYSTEM_INFO: &str = "/temporal.api.workflowservice.v1.WorkflowService/GetSystemInfo";
const GET_CLUSTER_INFO: &str = "/temporal.api.workflowservice.v1.WorkflowService/GetClusterInfo";

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct GetSystemInfoRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetSystemInfoResponse {
    #[prost(string, tag = "1")]
    pub server_version: String,
    #[prost(message, optional, tag = "2")]
    pub capabilities: Option<Capabilities>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Capabilities {
    #[prost(bool, tag = "1")]
    pub signal_and_query_header: bool,
    #[prost(bool, tag = "2")]
    pub internal_error_differentiation: bool,
    #[prost(bool, tag = "3")]
    pub activity_failure_include_heartbeat: bool,
    #[prost(bool, tag = "4")]
    pub supports_schedules: bool,
    #[prost(bool, tag = "5")]
    pub encoded_failure_attributes: bool,
    #[prost(bool, tag = "6")]
    pub build_id_based_versioning: bool,
    #[prost(bool, tag = "7")]
    pub upsert_memo: bool,
    #[prost(bool, tag = "8")]
    pub eager_workflow_start: bool,
    #[prost(bool, tag = "9")]
    pub sdk_metadata: bool,
    #[prost(bool, tag = "10")]
    pub count_group_by_execution_status: bool,
    #[prost(bool, tag = "11")]
    pub nexus: bool,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct GetClusterInfoRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetClusterInfoResponse {
    /// Client name to supported version range
    #[prost(map = "string, string", tag = "1")]
    pub supported_clients: HashMap<String, String>,
    #[prost(string, tag = "2")]
    pub server_version: String,
    #[prost(string, tag = "3")]
    pub cluster_id: String,
    #[prost(message, optional, tag = "4")]
    pub version_info: Option<VersionInfo>,
    #[prost(string, tag = "5")]
    pub cluster_name: String,
    #[prost(int32, tag = "6")]
    pub history_shard_count: i32,
    #[prost(string, tag = "7")]
    pub persistence_store: String,
    #[prost(string, tag = "8")]
    pub visibility_store: String,
    #[prost(int64, tag = "9")]
    pub initial_failover_version: i64,
    #[prost(int64, tag = "10")]
    pub failover_version_increment: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct VersionInfo {
    #[prost(message, optional, tag = "1")]
    pub current: Option<ReleaseInfo>,
    #[prost(message, optional, tag = "2")]
    pub recommended: Option<ReleaseInfo>,
    #[prost(string, tag = "3")]
    pub instructions: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ReleaseInfo {
    #[prost(string, tag = "1")]
    pub version: String,
    #[prost(string, tag = "3")]
    pub notes: String,
}

/// WorkflowService client over a plaintext tonic channel
#[derive(Debug, Clone)]
pub struct WorkflowServiceClient {
    inner: Grpc<Channel>,
}

impl WorkflowServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    pub async fn get_system_info(&mut self) -> Result<GetSystemInfoResponse, Status> {
        self.unary(GetSystemInfoRequest {}, GET_SYSTEM_INFO).await
    }

    pub async fn get_cluster_info(&mut self) -> Result<GetClusterInfoResponse, Status> {
        self.unary(GetClusterInfoRequest {}, GET_CLUSTER_INFO).await
    }

    async fn unary<Req, Resp>(&mut self, request: Req, path: &'static str) -> Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unknown(format!("service was not ready: {e}")))?;

        let codec = ProstCodec::<Req, Resp>::default();
        let response = self
            .inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static(path),
                codec,
            )
            .await?;
        Ok(response.into_inner())
    }
}

impl ControlPlane for WorkflowServiceClient {
    async fn system_info(&mut self) -> Result<String, Status> {
        let response = self.get_system_info().await?;
        Ok(format!("{response:?}"))
    }

    async fn cluster_info(&mut self) -> Result<String, Status> {
        let response = self.get_cluster_info().await?;
        Ok(format!("{response:?}"))
    }
}

/// Dials the target and waits until the channel is connected
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcConnector;

impl Connector for GrpcConnector {
    type Client = WorkflowServiceClient;

    async fn connect(&self, target: &Target) -> Result<WorkflowServiceClient, ProbeError> {
        let uri = target.endpoint_uri();
        // the transport is built without TLS
        if !uri.starts_with("http://") {
            return Err(ProbeError::InvalidTarget {
                target: target.to_string(),
                reason: "only plaintext http:// targets are supported".to_string(),
            });
        }

        let endpoint = Endpoint::from_shared(uri).map_err(|e| {
            ProbeError::InvalidTarget {
                target: target.to_string(),
                reason: e.to_string(),
            }
        })?;

        let channel = endpoint.connect().await.map_err(|e| ProbeError::Connect {
            target: target.to_string(),
            reason: error_chain(&e),
        })?;

        debug!(%target, "connected to temporal frontend");
        Ok(WorkflowServiceClient::new(channel))
    }
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
