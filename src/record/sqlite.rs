//! SQLite record store
//!
//! One table per record kind. Column and table names only ever come from
//! `RecordKind` / `SortField`, so they are safe to splice into SQL; all
//! request-provided values are bound.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::model::{ListQuery, NewRecord, Page, Record, RecordKind, RecordPatch};
use super::store::{RecordStore, StoreResult};

/// Pool size for file-backed databases
const MAX_CONNECTIONS: u32 = 5;

/// Record store backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if missing) the database at `url` and make sure every
    /// kind's table exists.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Each connection to `:memory:` is a separate database, so keep
        // exactly one alive for the lifetime of the pool.
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.ensure_tables().await?;
        Ok(store)
    }

    /// Create missing tables. Safe to call repeatedly.
    pub async fn ensure_tables(&self) -> StoreResult<()> {
        for kind in RecordKind::ALL {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    {secondary} TEXT
                )",
                table = kind.table(),
                secondary = kind.secondary_field(),
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn select_sql(kind: RecordKind) -> String {
    format!(
        "SELECT id, name, {} AS secondary FROM {}",
        kind.secondary_field(),
        kind.table()
    )
}

fn row_to_record(kind: RecordKind, row: &SqliteRow) -> Result<Record, sqlx::Error> {
    Ok(Record {
        kind,
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        secondary: row.try_get("secondary")?,
    })
}

fn push_name_filter(builder: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery) {
    if let Some(pattern) = query.like_pattern() {
        builder
            .push(" WHERE LOWER(name) LIKE LOWER(")
            .push_bind(pattern)
            .push(") ESCAPE '\\'");
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(&self, kind: RecordKind, record: NewRecord) -> StoreResult<Record> {
        let sql = format!(
            "INSERT INTO {} (name, {}) VALUES (?, ?)",
            kind.table(),
            kind.secondary_field()
        );
        let result = sqlx::query(&sql)
            .bind(&record.name)
            .bind(&record.secondary)
            .execute(&self.pool)
            .await?;

        Ok(Record {
            kind,
            id: result.last_insert_rowid(),
            name: record.name,
            secondary: record.secondary,
        })
    }

    async fn list(&self, kind: RecordKind, query: &ListQuery) -> StoreResult<Page> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM ");
        count.push(kind.table());
        push_name_filter(&mut count, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(select_sql(kind));
        push_name_filter(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort.column(kind))
            .push(" ")
            .push(query.order.as_sql())
            .push(", id ASC");
        if let Some((offset, limit)) = query.window() {
            select
                .push(" LIMIT ")
                .push_bind(i64::from(limit))
                .push(" OFFSET ")
                .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
        }

        let rows = select.build().fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(|row| row_to_record(kind, row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            records,
            total_items: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn get(&self, kind: RecordKind, id: i64) -> StoreResult<Option<Record>> {
        let sql = format!("{} WHERE id = ?", select_sql(kind));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_record(kind, &r)).transpose()?)
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: i64,
        patch: RecordPatch,
    ) -> StoreResult<Option<Record>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{} WHERE id = ?", select_sql(kind));
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };
        let mut record = row_to_record(kind, &row)?;
        record.apply(patch);

        let sql = format!(
            "UPDATE {} SET name = ?, {} = ? WHERE id = ?",
            kind.table(),
            kind.secondary_field()
        );
        sqlx::query(&sql)
            .bind(&record.name)
            .bind(&record.secondary)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(record))
    }

    async fn delete(&self, kind: RecordKind, id: i64) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{SortField, SortOrder};

    async fn memory_store() -> SqliteRecordStore {
        SqliteRecordStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = memory_store().await;
        let first = store
            .create(
                RecordKind::Item,
                NewRecord {
                    name: "First".to_string(),
                    secondary: Some("one".to_string()),
                },
            )
            .await
            .unwrap();
        let second = store
            .create(
                RecordKind::Item,
                NewRecord {
                    name: "Second".to_string(),
                    secondary: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let fetched = store.get(RecordKind::Item, 1).await.unwrap().unwrap();
        assert_eq!(fetched, first);
    }

    #[tokio::test]
    async fn test_list_escapes_like_wildcards() {
        let store = memory_store().await;
        for name in ["100% cotton", "100 percent", "under_score", "underscore"] {
            store
                .create(
                    RecordKind::Item,
                    NewRecord {
                        name: name.to_string(),
                        secondary: None,
                    },
                )
                .await
                .unwrap();
        }

        let percent = ListQuery {
            name_filter: Some("0%".to_string()),
            ..ListQuery::all()
        };
        let page = store.list(RecordKind::Item, &percent).await.unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.records[0].name, "100% cotton");

        let underscore = ListQuery {
            name_filter: Some("r_s".to_string()),
            ..ListQuery::all()
        };
        let page = store.list(RecordKind::Item, &underscore).await.unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.records[0].name, "under_score");
    }

    #[tokio::test]
    async fn test_list_sorts_by_secondary_descending() {
        let store = memory_store().await;
        for (name, email) in [("a", "b@x.io"), ("b", "c@x.io"), ("c", "a@x.io")] {
            store
                .create(
                    RecordKind::User,
                    NewRecord {
                        name: name.to_string(),
                        secondary: Some(email.to_string()),
                    },
                )
                .await
                .unwrap();
        }

        let query = ListQuery {
            sort: SortField::Secondary,
            order: SortOrder::Desc,
            ..ListQuery::all()
        };
        let page = store.list(RecordKind::User, &query).await.unwrap();
        let names: Vec<_> = page.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(page.total_items, 3);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_none() {
        let store = memory_store().await;
        let patch = RecordPatch {
            name: Some("nope".to_string()),
            secondary: None,
        };
        assert!(store.update(RecordKind::User, 42, patch).await.unwrap().is_none());
        assert!(!store.delete(RecordKind::User, 42).await.unwrap());
    }
}
