//! # Records
//!
//! The record model shared by every resource kind, the `RecordStore`
//! persistence trait, and its SQLite and in-memory implementations.

mod memory;
mod model;
mod sqlite;
mod store;

pub use memory::MemoryRecordStore;
pub use model::{
    ListQuery, NewRecord, Page, Record, RecordKind, RecordPatch, SortField, SortOrder,
};
pub use sqlite::SqliteRecordStore;
pub use store::{RecordStore, StoreError, StoreResult};
