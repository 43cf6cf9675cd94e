//! visentd: the Visent daemon.
//!
//! Loads both sentiment models, then serves the HTTP API. A model that
//! fails to load stops the process before it binds.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use visent::server::config::Config;
use visent::types::SentimentVariant;
use visent::{InferenceService, VisentError};

/// Visent daemon: Vietnamese sentiment classification service.
#[derive(Parser)]
#[command(name = "visentd")]
#[command(version = visent::PKG_VERSION)]
#[command(about = "Vietnamese sentiment classification HTTP service")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the configuration.
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }
    let addr = config.socket_addr()?;
    let device = config.device()?;

    info!(version = visent::version_string(), %addr, device = device.name(), "visentd starting");

    // Models load on the blocking pool; hub downloads and session setup are synchronous.
    let service = tokio::task::spawn_blocking(move || build_service(&config).map(|s| (s, config)))
        .await?;
    let (service, config) = service.inspect_err(|e| error!(error = %e, "failed to load models"))?;

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    let app = visent::server::router(Arc::new(service), config.server.max_upload_bytes);
    visent::server::serve(listener, app).await?;

    info!("visentd stopped");
    Ok(())
}

/// Build the [`InferenceService`] from configuration.
fn build_service(config: &Config) -> Result<InferenceService, VisentError> {
    let device = config.device()?;
    let default_max_length = config.inference.max_length;

    let three_class = config
        .models
        .get(SentimentVariant::ThreeClass)
        .onnx_config(SentimentVariant::ThreeClass, default_max_length)?;
    let five_class = config
        .models
        .get(SentimentVariant::FiveClass)
        .onnx_config(SentimentVariant::FiveClass, default_max_length)?;

    InferenceService::from_onnx(&three_class, &five_class, device)
}
