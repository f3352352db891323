//! In-memory record store
//!
//! Same listing semantics as the SQLite store. Ids are monotonic per kind
//! and never reused.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use super::model::{ListQuery, NewRecord, Page, Record, RecordKind, RecordPatch};
use super::store::{RecordStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Record>,
}

/// Record store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: RwLock<HashMap<RecordKind, Table>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, kind: RecordKind, record: NewRecord) -> StoreResult<Record> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let table = tables.entry(kind).or_default();

        table.last_id += 1;
        let created = Record {
            kind,
            id: table.last_id,
            name: record.name,
            secondary: record.secondary,
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list(&self, kind: RecordKind, query: &ListQuery) -> StoreResult<Page> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;

        let mut matching: Vec<Record> = tables
            .get(&kind)
            .map(|t| {
                t.rows
                    .values()
                    .filter(|r| query.matches(&r.name))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matching.sort_by(|a, b| query.compare(a, b));

        let total_items = matching.len() as u64;
        let records = match query.window() {
            Some((offset, limit)) => matching
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(limit as usize)
                .collect(),
            None => matching,
        };

        Ok(Page {
            records,
            total_items,
        })
    }

    async fn get(&self, kind: RecordKind, id: i64) -> StoreResult<Option<Record>> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.get(&kind).and_then(|t| t.rows.get(&id)).cloned())
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: i64,
        patch: RecordPatch,
    ) -> StoreResult<Option<Record>> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let Some(record) = tables.get_mut(&kind).and_then(|t| t.rows.get_mut(&id)) else {
            return Ok(None);
        };
        record.apply(patch);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, kind: RecordKind, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables
            .get_mut(&kind)
            .map(|t| t.rows.remove(&id).is_some())
            .unwrap_or(false))
    }
}
