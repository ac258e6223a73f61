//! Processing node: analyzes frames posted by the edge device

use anyhow::Context;
use clap::Parser;
use guidepath_core::config::GuideConfig;
use guidepath_server::{serve, ApiState};
use guidepath_spk::{select_engine, Narrator};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "guidepath-server")]
#[command(about = "Tactile path analysis server", long_about = None)]
struct Args {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for debug1.jpg and debug2.jpg
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Do not write debug images
    #[arg(long)]
    no_debug_artifacts: bool,

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

    if let Some(host) = &args.host {
        config.server.bind_address = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = &args.debug_dir {
        config.server.debug_dir = dir.clone();
    }
    if args.no_debug_artifacts {
        config.server.debug_artifacts = false;
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

    let narrator = Narrator::new(select_engine(&config.speech));
    info!("Speech engine: {}", narrator.engine_name());

    let state = ApiState::new(&config, narrator);
    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind_address))?;

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Server listening on http://{}", addr);

    serve(listener, state, wait_for_shutdown()).await?;

    info!("Server stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
