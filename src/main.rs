//! job-assistant - HTTP service for remote Kubernetes Job control

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_assistant::controller::{ControllerConfig, JobController, OWNERSHIP_SENTINEL};
use job_assistant::gateway::KubeJobGateway;

/// Remote lifecycle control for Kubernetes batch Jobs
#[derive(Parser, Debug)]
#[command(name = "job-assistant", version, about, long_about = None)]
struct Cli {
    /// Path to a kubeconfig file; when absent, the client infers its
    /// configuration (local kubeconfig, then in-cluster)
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<std::path::PathBuf>,

    /// Annotation key a Job must carry (with value "enable") to be managed
    #[arg(long, default_value = "job-assistant")]
    annotation: String,

    /// Listen address for the HTTP server
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let client = build_client(cli.kubeconfig.as_deref()).await?;

    let config = ControllerConfig {
        ownership_annotation: cli.annotation.clone(),
        ..ControllerConfig::default()
    };
    let controller = Arc::new(JobController::new(KubeJobGateway::new(client), config));
    let app = job_assistant::http::router(controller);

    info!(
        listen = %cli.listen,
        annotation = %cli.annotation,
        sentinel = OWNERSHIP_SENTINEL,
        "job-assistant serving"
    );

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build a Kubernetes client from an explicit kubeconfig when given,
/// otherwise fall back to inferred configuration (incl. in-cluster)
async fn build_client(kubeconfig: Option<&std::path::Path>) -> anyhow::Result<Client> {
    if let Some(path) = kubeconfig {
        match Kubeconfig::read_from(path) {
            Ok(kc) => {
                let config =
                    Config::from_custom_kubeconfig(kc, &KubeConfigOptions::default()).await?;
                return Ok(Client::try_from(config)?);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load kubeconfig, falling back to inferred config");
            }
        }
    }

    Client::try_default()
        .await
        .map_err(|e| anyhow::anyhow!("failed to build Kubernetes client: {e}"))
}
