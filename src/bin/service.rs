use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use canvas_extend::service::{Server, ServiceConfig, ServiceError};

/// HTTP service exposing `POST /extend-canvas` and `GET /health`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct ServiceArgs {
    /// JSON config file; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Spool directory for downloaded sources, overrides the config file
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Concurrent transforms, overrides the config file
    #[arg(long)]
    max_concurrency: Option<usize>,
}

async fn serve(args: ServiceArgs) -> Result<(), ServiceError> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(temp_dir) = args.temp_dir {
        config.temp_dir = temp_dir;
    }
    if let Some(n) = args.max_concurrency {
        config.max_concurrency = n;
    }

    let server = Server::bind(config).await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Cannot listen for Ctrl-C; shutting down");
            }
        })
        .await;
    info!("Service stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match serve(ServiceArgs::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Service failed");
            ExitCode::FAILURE
        }
    }
}
