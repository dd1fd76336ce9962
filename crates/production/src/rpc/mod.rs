//! HTTP status server for the monitor daemon.
//!
//! # Health & Readiness
//!
//! - `GET /health` - Liveness probe (always returns 200 if server running)
//! - `GET /ready` - Readiness probe (200 once monitoring started, 503 before)
//!
//! # Metrics & Observability
//!
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /api/v1/status` - Monitor status (witness, counters, rotations)
//!
//! # Example
//!
//! ```no_run
//! use sentinel_production::rpc::{RpcServer, RpcServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RpcServerConfig {
//!     listen_addr: "0.0.0.0:8080".parse()?,
//! };
//!
//! let server = RpcServer::new(config);
//! let handle = server.start().await?;
//! handle.set_ready(true);
//! # Ok(())
//! # }
//! ```

mod handlers;
mod routes;
mod server;
mod state;
mod types;

pub use server::{RpcServer, RpcServerConfig, RpcServerHandle};
pub use state::{MonitorStatusState, RpcState};
pub use types::*;
