//! vaultdrop server binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use vaultdrop_server::telemetry::init_tracing;
use vaultdrop_server::{router, ServerConfig};
use vaultdrop_store::FsStore;

#[derive(Parser, Debug)]
#[command(name = "vaultdrop-server", version, about = "Opaque store for encrypted file envelopes")]
struct Args {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Storage root (overrides VAULTDROP_STORAGE_DIR)
    #[arg(long)]
    storage_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.storage_dir {
        config.storage_dir = dir;
    }

    let store = Arc::new(FsStore::new(&config.storage_dir));
    store
        .recover()
        .await
        .with_context(|| format!("recovering store at {}", config.storage_dir.display()))?;

    let app = router(store, &config)?;
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;

    info!(
        addr = %listener.local_addr()?,
        storage = %config.storage_dir.display(),
        "vaultdrop server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("vaultdrop server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
