//! Record store abstraction
//!
//! Every operation addresses a single row of one kind's table and runs as
//! its own implicit transaction.

use async_trait::async_trait;
use thiserror::Error;

use super::model::{ListQuery, NewRecord, Page, Record, RecordKind, RecordPatch};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failures. None of these are client faults.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error reported by the database driver
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// An in-memory table lock was poisoned by a panicking writer
    #[error("Record store lock poisoned")]
    LockPoisoned,
}

/// Persistence layer for records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new row; the store assigns the id
    async fn create(&self, kind: RecordKind, record: NewRecord) -> StoreResult<Record>;

    /// Filter, sort and paginate rows of one kind
    async fn list(&self, kind: RecordKind, query: &ListQuery) -> StoreResult<Page>;

    /// Fetch a row by primary key
    async fn get(&self, kind: RecordKind, id: i64) -> StoreResult<Option<Record>>;

    /// Apply a partial update. Returns `None` if no row has this id.
    async fn update(
        &self,
        kind: RecordKind,
        id: i64,
        patch: RecordPatch,
    ) -> StoreResult<Option<Record>>;

    /// Remove a row. Returns `false` if no row has this id.
    async fn delete(&self, kind: RecordKind, id: i64) -> StoreResult<bool>;
}
