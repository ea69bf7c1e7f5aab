//! sanctuary: browse, edit and preview a local directory tree from the browser.
//!
//! This binary:
//! - Serves the editor shell and file-manager sidebar on the main address
//! - Tracks one current directory for all navigation and create/delete calls
//! - Runs an analyzer against the open file on demand
//! - Toggles a static preview server on a second, fixed address
//! - Shuts down on Ctrl+C, SIGTERM, or a quit request from the interface

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sanctuary_local::create_backends;
use sanctuary_server::launch::open_browser;
use sanctuary_server::{
    router, AppState, Config, PreviewServer, ShutdownListener, ShutdownTrigger, Workspace,
};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate().map_err(anyhow::Error::msg)?;

    let root = match config.root.clone() {
        Some(root) => root,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    info!("Starting sanctuary v{}", env!("CARGO_PKG_VERSION"));
    info!("  Address: {}", config.listen_addr());
    info!("  Preview: {}", config.preview_addr());
    info!("  Root: {}", root.display());
    info!("  Analyzer: {}", config.analyzer);

    let (fs, analyzer) = create_backends(&config.analyzer);
    let preview = PreviewServer::new(config.preview_addr(), config.preview_grace());
    let workspace = Arc::new(Workspace::new(&root, fs, analyzer, preview).await?);

    let (shutdown, shutdown_listener) = ShutdownTrigger::new();
    let state = AppState {
        workspace: workspace.clone(),
        shutdown,
    };
    let app = router(state);

    // Bind and serve
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    if !config.no_browser {
        open_browser(format!("http://{}", addr));
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_listener))
        .await?;

    // The preview listener must not outlive the main service
    workspace.stop_preview().await;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal(quit: ShutdownListener) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, initiating shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, initiating shutdown");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_requested = async move {
        quit.wait().await;
        info!("Quit requested, initiating shutdown");
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = quit_requested => {},
    }
}
