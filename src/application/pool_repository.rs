// Repository port for the pool data source
use crate::domain::epoch::EpochInfo;
use crate::domain::pool::{PoolHistory, PoolSummary};
use async_trait::async_trait;
use thiserror::Error;

/// Errors a fetch can fail with. All of them are contained within one
/// refresh cycle and downgraded to slot/status state.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Request could not complete (connect, timeout, transport)
    #[error("network failure: {0}")]
    Network(String),

    /// Non-success HTTP response code
    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),

    /// The endpoint answered with zero records
    #[error("empty payload")]
    EmptyPayload,

    /// Malformed body or missing expected fields
    #[error("malformed payload: {0}")]
    Parse(String),
}

#[async_trait]
pub trait PoolRepository: Send + Sync {
    /// Most recent epoch metadata.
    async fn latest_epoch(&self) -> Result<EpochInfo, FetchError>;

    /// Per-epoch records for the pool, at most `limit`, chronological order.
    async fn pool_history(&self, pool_id: &str, limit: usize) -> Result<PoolHistory, FetchError>;

    /// Identity and live figures for the pool.
    async fn pool_summary(&self, pool_id: &str) -> Result<PoolSummary, FetchError>;
}
