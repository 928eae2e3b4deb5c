//! Chain guard: verify the connected network before any mail operation.
//!
//! The check is never cached. A network switch mid-session is caught on the
//! next operation.

use std::future::Future;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::observability::metrics;

/// Source of the active network's chain ID.
pub trait ChainQuery: Send + Sync {
    fn chain_id(&self) -> impl Future<Output = BlockchainResult<ChainId>> + Send;
}

impl ChainQuery for ChainClient {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.get_chain_id().await
    }
}

/// Rejects operations when the active chain differs from the expected one.
#[derive(Debug, Clone)]
pub struct ChainGuard<Q> {
    query: Q,
    expected: String,
}

impl<Q: ChainQuery> ChainGuard<Q> {
    pub fn new(query: Q, expected: impl Into<String>) -> Self {
        Self {
            query,
            expected: expected.into(),
        }
    }

    /// Query the chain ID and compare it, as a string, to the expected value.
    pub async fn check(&self) -> BlockchainResult<()> {
        let actual = self.query.chain_id().await?.to_string();
        if actual != self.expected {
            metrics::record_chain_guard_rejection();
            tracing::warn!(
                expected = %self.expected,
                actual = %actual,
                "Please switch to iExec chain"
            );
            return Err(BlockchainError::ChainMismatch {
                expected: self.expected.clone(),
                actual,
            });
        }
        Ok(())
    }
}
