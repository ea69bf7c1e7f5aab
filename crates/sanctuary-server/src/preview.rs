//! Lifecycle of the secondary static-file server.
//!
//! The server is either stopped or running on one bound address. Every
//! transition runs inside the same async mutex, so concurrent start/stop
//! requests are applied one at a time: a second `start` sees `Running` and
//! returns, and a `stop` racing a `start` can never close a listener twice
//! or leave two listeners bound.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::ServerError;

/// Externally visible preview state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PreviewStatus {
    Stopped,
    Running { address: SocketAddr, root: PathBuf },
}

impl PreviewStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, PreviewStatus::Running { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(SocketAddr),
    AlreadyRunning(SocketAddr),
}

impl StartOutcome {
    pub fn address(&self) -> SocketAddr {
        match self {
            StartOutcome::Started(addr) | StartOutcome::AlreadyRunning(addr) => *addr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

struct RunningPreview {
    address: SocketAddr,
    root: PathBuf,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

enum PreviewState {
    Stopped,
    Running(RunningPreview),
}

pub struct PreviewServer {
    bind_addr: String,
    grace: Duration,
    state: Mutex<PreviewState>,
}

impl PreviewServer {
    pub fn new(bind_addr: impl Into<String>, grace: Duration) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            grace,
            state: Mutex::new(PreviewState::Stopped),
        }
    }

    /// Configured bind address, e.g. `127.0.0.1:8081`.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Bind the preview listener and serve `root` from a background task.
    ///
    /// Idempotent: when already running this returns the live address without
    /// rebinding. A bind failure leaves the state `Stopped`.
    pub async fn start(&self, root: &Path) -> Result<StartOutcome, ServerError> {
        let mut state = self.state.lock().await;

        if let PreviewState::Running(running) = &*state {
            if !running.task.is_finished() {
                return Ok(StartOutcome::AlreadyRunning(running.address));
            }
            warn!(
                "Preview server on {} exited on its own, rebinding",
                running.address
            );
            *state = PreviewState::Stopped;
        }

        let listener = TcpListener::bind(&self.bind_addr).await.map_err(|e| {
            warn!("Preview bind on {} failed: {}", self.bind_addr, e);
            ServerError::PreviewUnavailable {
                addr: self.bind_addr.clone(),
                reason: e.to_string(),
            }
        })?;
        let address = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Preview listener has no address: {}", e)))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = preview_router(root);
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                error!("Preview server on {} failed: {}", address, e);
            }
        });

        info!("Preview server serving {} on http://{}", root.display(), address);
        *state = PreviewState::Running(RunningPreview {
            address,
            root: root.to_path_buf(),
            shutdown: shutdown_tx,
            task,
        });
        Ok(StartOutcome::Started(address))
    }

    /// Close the listener and release the port. No-op when already stopped.
    pub async fn stop(&self) -> StopOutcome {
        let mut state = self.state.lock().await;

        let running = match std::mem::replace(&mut *state, PreviewState::Stopped) {
            PreviewState::Stopped => return StopOutcome::AlreadyStopped,
            PreviewState::Running(running) => running,
        };
        let RunningPreview {
            address,
            shutdown,
            mut task,
            ..
        } = running;

        // Err means the serve task is already gone
        let _ = shutdown.send(());
        if tokio::time::timeout(self.grace, &mut task).await.is_err() {
            warn!(
                "Preview server on {} still draining after {:?}, aborting",
                address, self.grace
            );
            task.abort();
            let _ = task.await;
        }

        info!("Preview server on {} stopped", address);
        StopOutcome::Stopped
    }

    pub async fn status(&self) -> PreviewStatus {
        match &*self.state.lock().await {
            PreviewState::Running(running) if !running.task.is_finished() => {
                PreviewStatus::Running {
                    address: running.address,
                    root: running.root.clone(),
                }
            }
            _ => PreviewStatus::Stopped,
        }
    }
}

fn preview_router(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn preview() -> PreviewServer {
        PreviewServer::new("127.0.0.1:0", Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_start_twice_binds_once() {
        let temp_dir = TempDir::new().unwrap();
        let server = preview();

        let first = server.start(temp_dir.path()).await.unwrap();
        let second = server.start(temp_dir.path()).await.unwrap();

        assert!(matches!(first, StartOutcome::Started(_)));
        assert_eq!(second, StartOutcome::AlreadyRunning(first.address()));
        assert_eq!(
            server.status().await,
            PreviewStatus::Running {
                address: first.address(),
                root: temp_dir.path().to_path_buf(),
            }
        );

        assert_eq!(server.stop().await, StopOutcome::Stopped);
    }

    #[tokio::test]
    async fn test_stop_when_stopped_is_noop() {
        let server = preview();
        assert_eq!(server.stop().await, StopOutcome::AlreadyStopped);
        assert_eq!(server.status().await, PreviewStatus::Stopped);
    }

    #[tokio::test]
    async fn test_stop_releases_port() {
        let temp_dir = TempDir::new().unwrap();
        let server = preview();

        let address = server.start(temp_dir.path()).await.unwrap().address();
        assert_eq!(server.stop().await, StopOutcome::Stopped);
        assert_eq!(server.stop().await, StopOutcome::AlreadyStopped);
        assert_eq!(server.status().await, PreviewStatus::Stopped);

        // The exact address must be bindable again
        let rebound = TcpListener::bind(address).await;
        assert!(rebound.is_ok(), "port {} still held", address);
    }

    #[tokio::test]
    async fn test_bind_conflict_reports_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = occupied.local_addr().unwrap();
        let server = PreviewServer::new(addr.to_string(), Duration::from_secs(1));

        let result = server.start(temp_dir.path()).await;
        assert!(matches!(result, Err(ServerError::PreviewUnavailable { .. })));
        assert_eq!(server.status().await, PreviewStatus::Stopped);
        assert_eq!(server.stop().await, StopOutcome::AlreadyStopped);

        // Once the outside holder goes away the preview can start
        drop(occupied);
        let started = server.start(temp_dir.path()).await.unwrap();
        assert_eq!(started, StartOutcome::Started(addr));
        server.stop().await;
    }

    #[tokio::test]
    async fn test_restart_after_stop_serves_new_root() {
        let first_root = TempDir::new().unwrap();
        let second_root = TempDir::new().unwrap();
        let server = preview();

        server.start(first_root.path()).await.unwrap();
        server.stop().await;
        server.start(second_root.path()).await.unwrap();

        match server.status().await {
            PreviewStatus::Running { root, .. } => assert_eq!(root, second_root.path()),
            PreviewStatus::Stopped => panic!("preview should be running"),
        }
        server.stop().await;
    }
}
