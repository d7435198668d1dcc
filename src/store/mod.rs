mod memory;

pub use memory::InMemoryStore;

use crate::record::RuleRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a [`RuleStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write found a record with the same id already present
    #[error("conditional check failed: record already exists")]
    ConditionalCheckFailed,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store holding [`RuleRecord`]s keyed by their id.
///
/// Implementations are shared between concurrent operations and must be safe
/// for concurrent use. Batch calls chunk internally when the backend limits
/// request size.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Read every record in the table
    async fn scan_all(&self) -> StoreResult<Vec<RuleRecord>>;

    /// Write a record only if no record with its id exists.
    ///
    /// Returns [`StoreError::ConditionalCheckFailed`] when one does.
    async fn put_if_absent(&self, record: &RuleRecord) -> StoreResult<()>;

    /// Delete a record by id, succeeding when it does not exist
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Write records unconditionally, returning how many were written
    async fn batch_put(&self, records: &[RuleRecord]) -> StoreResult<usize>;

    /// Delete records by id, returning how many were actually removed
    async fn batch_delete(&self, ids: &[String]) -> StoreResult<usize>;
}
