//! Witness Sentinel
//!
//! Production daemon that watches a witness account's missed-block counter
//! and rotates its signing key through a ring of standby keys when misses
//! accumulate.
//!
//! # Usage
//!
//! ```bash
//! # Start with configuration file
//! witness-sentinel --config sentinel.toml
//!
//! # Override the monitored account
//! witness-sentinel --config sentinel.toml --account my-witness
//!
//! # Add wallet endpoints on top of the configured list
//! witness-sentinel --config sentinel.toml --endpoint http://127.0.0.1:8092/
//! ```
//!
//! # Configuration
//!
//! Example TOML:
//!
//! ```toml
//! [witness]
//! account = "my-witness"
//! proposal_url = "https://example.com/witness"
//! backup_keys = ["BTS_backup_one", "BTS_backup_two"]
//!
//! [chain]
//! endpoints = ["http://127.0.0.1:8092/"]
//! request_timeout_secs = 10
//!
//! [monitor]
//! sample_interval_secs = 30
//! flip_threshold = 3
//! reset_threshold = 240
//! confirm_delay_secs = 6
//!
//! [rpc]
//! enabled = true
//! listen_addr = "0.0.0.0:8080"
//! ```
//!
//! The wallet unlock password is read from `chain.wallet_password` or, by
//! preference, the `WITNESS_SENTINEL_WALLET_PASSWORD` environment variable.

use anyhow::{Context, Result};
use clap::Parser;
use sentinel_monitor::{FailoverState, MonitorConfig};
use sentinel_production::chain::{ChainReader, WalletRpcClient, WalletRpcConfig};
use sentinel_production::rpc::{RpcServer, RpcServerConfig};
use sentinel_production::MonitorRunner;
use sentinel_types::{KeyRing, SigningKey, WitnessName};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the wallet unlock password.
const WALLET_PASSWORD_ENV: &str = "WITNESS_SENTINEL_WALLET_PASSWORD";

/// Witness Sentinel
///
/// Monitors a witness for missed blocks and fails over its signing key.
#[derive(Parser, Debug)]
#[command(name = "witness-sentinel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Witness account to monitor (overrides config)
    #[arg(long)]
    account: Option<String>,

    /// Wallet endpoint URL (can be specified multiple times)
    #[arg(long)]
    endpoint: Vec<String>,

    /// Status server listen address (overrides config)
    #[arg(long)]
    rpc_addr: Option<String>,

    /// Log level filter (overrides RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Top-level sentinel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SentinelConfig {
    /// Witness identity and standby keys
    pub witness: WitnessConfig,

    /// Chain/wallet access configuration
    pub chain: ChainConfig,

    /// Monitoring thresholds
    #[serde(default)]
    pub monitor: MonitorToml,

    /// Status server configuration
    #[serde(default)]
    pub rpc: RpcConfig,
}

/// Witness identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WitnessConfig {
    /// Witness account name to monitor
    pub account: String,

    /// Witness URL republished with every key update
    pub proposal_url: String,

    /// Standby signing keys, rotated through in order
    pub backup_keys: Vec<String>,
}

/// Chain access configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Wallet/API endpoint URLs, tried in order on transport failure
    pub endpoints: Vec<String>,

    /// Wallet unlock password (prefer the environment variable)
    #[serde(default)]
    pub wallet_password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Monitoring thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorToml {
    /// Seconds between witness status samples
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,

    /// Misses within an epoch before the key is rotated
    #[serde(default = "default_flip_threshold")]
    pub flip_threshold: u64,

    /// Miss-free samples before old misses are forgiven
    #[serde(default = "default_reset_threshold")]
    pub reset_threshold: u64,

    /// Seconds to wait before confirming a key update on-chain
    #[serde(default = "default_confirm_delay_secs")]
    pub confirm_delay_secs: u64,
}

impl Default for MonitorToml {
    fn default() -> Self {
        Self {
            sample_interval_secs: default_sample_interval_secs(),
            flip_threshold: default_flip_threshold(),
            reset_threshold: default_reset_threshold(),
            confirm_delay_secs: default_confirm_delay_secs(),
        }
    }
}

fn default_sample_interval_secs() -> u64 {
    30
}

fn default_flip_threshold() -> u64 {
    3
}

fn default_reset_threshold() -> u64 {
    240
}

fn default_confirm_delay_secs() -> u64 {
    6
}

/// Status server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Enable the HTTP status/metrics server
    #[serde(default = "default_rpc_enabled")]
    pub enabled: bool,

    /// HTTP listen address
    #[serde(default = "default_rpc_addr")]
    pub listen_addr: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            enabled: default_rpc_enabled(),
            listen_addr: default_rpc_addr(),
        }
    }
}

fn default_rpc_enabled() -> bool {
    true
}

fn default_rpc_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl SentinelConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply CLI overrides to the configuration.
    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(ref account) = cli.account {
            self.witness.account = account.clone();
        }

        if !cli.endpoint.is_empty() {
            self.chain.endpoints.extend(cli.endpoint.clone());
        }

        if let Some(ref rpc_addr) = cli.rpc_addr {
            self.rpc.listen_addr = rpc_addr.clone();
        }
    }
}

/// Build wallet client configuration from TOML config.
///
/// The environment variable takes precedence so the password can stay out
/// of the config file.
fn build_wallet_config(config: &ChainConfig) -> WalletRpcConfig {
    let wallet_password = std::env::var(WALLET_PASSWORD_ENV)
        .ok()
        .or_else(|| config.wallet_password.clone());

    WalletRpcConfig {
        endpoints: config.endpoints.clone(),
        wallet_password,
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    }
}

/// Build monitor thresholds from TOML config.
fn build_monitor_config(config: &MonitorToml) -> MonitorConfig {
    MonitorConfig::new()
        .with_flip_threshold(config.flip_threshold)
        .with_reset_threshold(config.reset_threshold)
        .with_confirm_delay(Duration::from_secs(config.confirm_delay_secs))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    info!("Witness Sentinel starting...");

    // Load configuration
    let mut config = SentinelConfig::load(&cli.config)?;
    config.apply_overrides(&cli);

    let witness = WitnessName::new(config.witness.account.clone());
    let ring = KeyRing::new(
        config
            .witness
            .backup_keys
            .iter()
            .map(|k| SigningKey::from(k.as_str()))
            .collect(),
    )
    .context("At least one backup key must be configured")?;

    info!(
        witness = %witness,
        backup_keys = ring.len(),
        endpoints = config.chain.endpoints.len(),
        "Sentinel configuration loaded"
    );

    // Connect to the wallet and take the initial witness snapshot
    let client = Arc::new(
        WalletRpcClient::new(build_wallet_config(&config.chain))
            .context("Failed to create wallet client")?,
    );

    let initial = client
        .witness_status(&witness)
        .await
        .context("Failed to fetch initial witness status")?;
    info!(
        total_missed = initial.total_missed,
        active_key = %initial.signing_key.prefix(),
        "Initial witness status fetched"
    );

    let state = FailoverState::new(
        witness.clone(),
        ring,
        &initial,
        build_monitor_config(&config.monitor),
    );

    // Start the status server
    let rpc_handle = if config.rpc.enabled {
        let rpc_config = RpcServerConfig {
            listen_addr: config.rpc.listen_addr.parse().with_context(|| {
                format!("Invalid rpc listen address: {}", config.rpc.listen_addr)
            })?,
        };

        let handle = RpcServer::new(rpc_config)
            .start()
            .await
            .context("Failed to start RPC server")?;

        {
            let mut status = handle.status().write().await;
            status.witness = witness.to_string();
            status.active_key_prefix = initial.signing_key.prefix().to_string();
        }

        Some(handle)
    } else {
        None
    };

    // Create the monitor runner
    let sample_interval = Duration::from_secs(config.monitor.sample_interval_secs);
    let (mut runner, shutdown_handle) = MonitorRunner::new(
        state,
        client.clone(),
        client,
        config.witness.proposal_url.clone(),
        sample_interval,
    );
    if let Some(ref handle) = rpc_handle {
        runner = runner.with_status_state(handle.status().clone());
    }

    // Spawn shutdown signal handler
    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C"),
            _ = terminate => info!("Received SIGTERM"),
        }

        info!("Initiating graceful shutdown...");
        shutdown_handle.shutdown();
    });

    // Mark the daemon as ready
    if let Some(ref handle) = rpc_handle {
        handle.set_ready(true);
    }

    info!("Sentinel started, press Ctrl+C to stop");

    // Run the monitor loop
    runner.run().await;

    // Cleanup RPC server
    if let Some(handle) = rpc_handle {
        handle.abort();
    }

    info!("Sentinel shutdown complete");
    Ok(())
}
