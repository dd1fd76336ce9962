//! RPC server implementation.

use super::routes::create_router;
use super::state::{MonitorStatusState, RpcState};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Errors from the RPC server.
#[derive(Debug, Error)]
pub enum RpcServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

/// Configuration for the RPC server.
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    /// Address to listen on.
    pub listen_addr: SocketAddr,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Handle for controlling a running RPC server.
pub struct RpcServerHandle {
    /// Task handle for the server.
    task: JoinHandle<()>,
    /// Ready flag to set once monitoring starts.
    ready_flag: Arc<AtomicBool>,
    /// Monitor status provider for runner updates.
    status: Arc<RwLock<MonitorStatusState>>,
}

impl RpcServerHandle {
    /// Mark the daemon as ready (for readiness probe).
    pub fn set_ready(&self, ready: bool) {
        self.ready_flag.store(ready, Ordering::SeqCst);
    }

    /// Get a reference to the monitor status for updates.
    pub fn status(&self) -> &Arc<RwLock<MonitorStatusState>> {
        &self.status
    }

    /// Abort the server.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the server to finish.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.task.await
    }
}

/// HTTP server exposing health, metrics and monitor status.
pub struct RpcServer {
    config: RpcServerConfig,
    state: RpcState,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(config: RpcServerConfig) -> Self {
        let state = RpcState {
            ready: Arc::new(AtomicBool::new(false)),
            status: Arc::new(RwLock::new(MonitorStatusState::default())),
            start_time: Instant::now(),
        };

        Self { config, state }
    }

    /// Start the server and return a handle for control.
    pub async fn start(self) -> Result<RpcServerHandle, RpcServerError> {
        let addr = self.config.listen_addr;
        let ready_flag = self.state.ready.clone();
        let status = self.state.status.clone();

        let router = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %addr, "RPC server listening");

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = ?e, "RPC server error");
            }
        });

        Ok(RpcServerHandle {
            task,
            ready_flag,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RpcServerConfig::default();
        assert_eq!(config.listen_addr.port(), 8080);
    }

    #[tokio::test]
    async fn test_server_start_and_ready_flip() {
        let config = RpcServerConfig {
            listen_addr: "127.0.0.1:0".parse().unwrap(),
        };
        let handle = RpcServer::new(config).start().await.unwrap();

        handle.set_ready(true);
        assert!(handle.ready_flag.load(Ordering::SeqCst));
        handle.abort();
    }
}
