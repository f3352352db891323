//! # Record Service
//!
//! Translates validated requests into single-row store operations and
//! shapes the results into envelopes.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};
use crate::record::{Record, RecordKind, RecordStore};

use super::errors::{ApiError, ApiResult};
use super::parser::{parse_list_query, parse_new_record, parse_patch};
use super::response::{Envelope, ListEnvelope};

/// Request-level operations over a record store
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validate and insert a new record
    pub async fn create(&self, kind: RecordKind, body: &Value) -> ApiResult<Envelope<Record>> {
        let new_record = parse_new_record(kind, body)?;
        let record = self.store.create(kind, new_record).await?;

        log_record_event(Event::RecordCreated, &record);
        Ok(Envelope::success(format!("{} created", kind.label()), record))
    }

    /// Filter, sort and paginate
    pub async fn list(
        &self,
        kind: RecordKind,
        params: &HashMap<String, String>,
    ) -> ApiResult<ListEnvelope<Record>> {
        let query = parse_list_query(kind, params)?;
        let page = self.store.list(kind, &query).await?;

        Ok(ListEnvelope::new(
            format!("{} fetched", kind.plural_label()),
            page.records,
            query.page,
            query.total_pages(page.total_items),
            page.total_items,
        ))
    }

    /// Look up one record by id
    pub async fn find(&self, kind: RecordKind, id: i64) -> ApiResult<Record> {
        self.store
            .get(kind, id)
            .await?
            .ok_or(ApiError::RecordNotFound(kind.label()))
    }

    /// Overwrite the fields of `current` that are present in `body`.
    ///
    /// `current` comes from [`RecordService::find`], so a missing id is
    /// reported before the body is looked at.
    pub async fn update(&self, current: Record, body: &Value) -> ApiResult<Envelope<Record>> {
        let kind = current.kind;
        let patch = parse_patch(kind, body)?;
        let record = self
            .store
            .update(kind, current.id, patch)
            .await?
            .ok_or(ApiError::RecordNotFound(kind.label()))?;

        log_record_event(Event::RecordUpdated, &record);
        Ok(Envelope::success(format!("{} updated", kind.label()), record))
    }

    /// Permanently remove a record
    pub async fn delete(&self, kind: RecordKind, id: i64) -> ApiResult<Envelope<()>> {
        if !self.store.delete(kind, id).await? {
            return Err(ApiError::RecordNotFound(kind.label()));
        }

        let id = id.to_string();
        log_event_with_fields(
            Event::RecordDeleted,
            &[("kind", kind.table()), ("id", id.as_str())],
        );
        Ok(Envelope::empty(format!("{} deleted", kind.label())))
    }
}

fn log_record_event(event: Event, record: &Record) {
    let id = record.id.to_string();
    log_event_with_fields(event, &[("kind", record.kind.table()), ("id", id.as_str())]);
}
