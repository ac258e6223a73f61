//! Edge device: captures frames and speaks the instructions

use anyhow::Context;
use clap::Parser;
use guidepath_core::config::{CaptureSource, GuideConfig};
use guidepath_edge::{EdgeSession, GuideClient};
use guidepath_eye::open_source;
use guidepath_spk::select_engine;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "guidepath-edge")]
#[command(about = "Tactile path guidance client", long_about = None)]
#[command(after_help = "Without --image a device camera is used, which needs a build with --features camera.")]
struct Args {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Processing node URL
    #[arg(short, long)]
    server: Option<String>,

    /// Seconds between captures
    #[arg(short, long)]
    interval: Option<f64>,

    /// Read frames from an image file or directory instead of a camera
    #[arg(long, conflicts_with = "camera")]
    image: Option<PathBuf>,

    /// Camera index
    #[arg(long)]
    camera: Option<u32>,

    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> anyhow::Result<GuideConfig> {
    let mut config = match &args.config {
        Some(path) => GuideConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GuideConfig::default(),
    };
    config.apply_env();

    if let Some(server) = &args.server {
        config.edge.server_url = server.clone();
    }
    if let Some(interval) = args.interval {
        config.edge.interval_secs = interval;
    }
    if let Some(path) = &args.image {
        config.edge.source = CaptureSource::Images(path.clone());
    }
    if let Some(id) = args.camera {
        config.edge.source = CaptureSource::Camera(id);
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .init();

    info!("Tactile path guidance client");

    let source = match open_source(&config.edge) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to open frame source: {}", e);
            std::process::exit(1);
        }
    };

    let client = GuideClient::new(&config.edge)?;
    info!("Checking server: {}", client.base_url());
    if !client.check_health().await {
        error!("Could not connect to the server! Make sure the server is running.");
        error!("Expected address: {}", client.base_url());
        std::process::exit(1);
    }
    info!("Server connection successful");

    let speaker = select_engine(&config.speech);
    info!("Client started. Server: {}, frames from {}", client.base_url(), source.name());

    let session = EdgeSession::new(source, client, speaker, &config);
    let summary = session.run(wait_for_interrupt()).await;
    info!(
        "{} cycles, {} announcements, {} skipped",
        summary.cycles, summary.announcements, summary.skipped
    );
    Ok(())
}

async fn wait_for_interrupt() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
