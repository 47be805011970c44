use crate::error::{ExporterError, Result};
use crate::telemetry::health::{internal_error_response, not_found_response};
use crate::telemetry::{handle_metrics, health_check_response};
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Bind the scrape endpoint.
///
/// Failing here is the one condition the exporter cannot run without.
pub async fn bind_metrics_listener(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ExporterError::Bind { addr, source })
}

/// Serve the metrics endpoint until `shutdown` is cancelled.
/// - `/metrics` - Prometheus metrics
/// - `/health` - Health check endpoint
pub async fn serve_metrics(
    listener: TcpListener,
    registry: Registry,
    shutdown: CancellationToken,
) -> Result<()> {
    let registry = Arc::new(registry);
    let addr = listener.local_addr()?;

    info!(?addr, "metrics server started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("metrics server: shutdown requested");
                break;
            }
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok((stream, peer)) => (stream, peer),
                    Err(e) => {
                        warn!(error = %e, "metrics server: accept error");
                        continue;
                    }
                };

                let registry = registry.clone();
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let registry = registry.clone();
                        async move {
                            let response = match req.uri().path() {
                                "/metrics" => handle_metrics(&registry),
                                "/health" => health_check_response(),
                                _ => Ok(not_found_response()),
                            };
                            Ok::<_, hyper::Error>(response.unwrap_or_else(|e| {
                                error!(error = %e, "metrics server: failed to build response");
                                internal_error_response()
                            }))
                        }
                    });

                    let builder = ConnBuilder::new(TokioExecutor::new());
                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        warn!(?peer, error = %e, "metrics server: serve_connection error");
                    }
                });
            }
        }
    }

    info!("metrics server stopped");
    Ok(())
}
