//! Chain access for the monitor runner.
//!
//! The runner talks to the chain through two narrow traits: a read-only
//! status query and a key-update submitter. Production implements both
//! with [`WalletRpcClient`]; tests use scripted fakes.
//!
//! Both calls are treated as blocking operations with their own internal
//! timeouts; every error they surface is recoverable from the monitor's
//! point of view and simply retried on a later tick.

mod wallet_rpc;

pub use wallet_rpc::{WalletRpcClient, WalletRpcConfig};

use async_trait::async_trait;
use sentinel_types::{SigningKey, WitnessName, WitnessStatus};
use thiserror::Error;

/// Errors from chain access.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("wallet error: {0}")]
    Wallet(String),
    #[error("no endpoints configured")]
    NoEndpoints,
}

/// Read-only query of a witness's current on-chain status.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn witness_status(&self, witness: &WitnessName) -> Result<WitnessStatus, ChainError>;
}

/// Submits signed update-witness transactions.
#[async_trait]
pub trait KeyRotator: Send + Sync {
    async fn submit_key_update(
        &self,
        witness: &WitnessName,
        proposal_url: &str,
        key: &SigningKey,
    ) -> Result<(), ChainError>;
}
