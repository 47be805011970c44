#![forbid(unsafe_code)]

use clap::Parser;
use std::sync::Arc;
use temporal_version_exporter_lib::telemetry::{
    bind_metrics_listener, init_metrics, init_tracing, serve_metrics,
};
use temporal_version_exporter_lib::{
    Cli, Config, GrpcConnector, Prober, RefreshLoop, VersionState,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(&cli.log_level, false) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    let cfg = match Config::from_cli(cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };
    info!(
        address = %cfg.target,
        listen = %cfg.listen,
        interval = ?cfg.scrape_interval,
        "configuration loaded"
    );

    let (metrics, registry) = match init_metrics() {
        Ok(pair) => pair,
        Err(err) => {
            error!(%err, "failed to initialize metrics");
            std::process::exit(1);
        }
    };

    let state = match VersionState::register(&registry, cfg.stale_series) {
        Ok(state) => Arc::new(state),
        Err(err) => {
            error!(%err, "failed to register version metrics");
            std::process::exit(1);
        }
    };

    let listener = match bind_metrics_listener(cfg.listen).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, "metrics http server failed");
            std::process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve_metrics(listener, registry, shutdown.clone()));

    let prober = Prober::new(GrpcConnector, cfg.target.clone(), cfg.probe_timeout);
    let refresh = RefreshLoop::new(prober, state, cfg.scrape_interval).with_metrics(metrics);

    tokio::select! {
        _ = refresh.run(shutdown.clone()) => {}
        _ = wait_for_signal() => {
            info!("shutdown signal received");
        }
    }
    shutdown.cancel();

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(%err, "metrics server exited with error"),
        Err(err) => warn!(%err, "metrics server task failed"),
    }
}

async fn wait_for_signal() {
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            warn!(%err, "failed to install SIGTERM handler, waiting for ctrl-c only");
            if let Err(err) = signal::ctrl_c().await {
                error!(%err, "failed to listen for ctrl-c");
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {}
        result = signal::ctrl_c() => {
            if let Err(err) = result {
                error!(%err, "failed to listen for ctrl-c");
            }
        }
    }
}
