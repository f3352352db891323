//! Record data model
//!
//! A record is a single row: a store-assigned `id`, a required `name`, and
//! one optional secondary attribute whose name depends on the resource kind.

use std::cmp::Ordering;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Which resource collection a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// `/item` collection, secondary attribute `description`
    Item,
    /// `/api/users` collection, secondary attribute `email`
    User,
}

impl RecordKind {
    /// Every kind served by the HTTP layer
    pub const ALL: [RecordKind; 2] = [RecordKind::Item, RecordKind::User];

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Item => "item",
            RecordKind::User => "users",
        }
    }

    /// HTTP collection path
    pub fn collection_path(&self) -> &'static str {
        match self {
            RecordKind::Item => "/item",
            RecordKind::User => "/api/users",
        }
    }

    /// Name of the secondary attribute (JSON key and column name)
    pub fn secondary_field(&self) -> &'static str {
        match self {
            RecordKind::Item => "description",
            RecordKind::User => "email",
        }
    }

    /// Whether the secondary attribute must be present and non-empty
    pub fn secondary_required(&self) -> bool {
        matches!(self, RecordKind::User)
    }

    /// Page size applied when the request names none. `None` means the
    /// whole result set is returned as one page.
    pub fn default_per_page(&self) -> Option<u32> {
        match self {
            RecordKind::Item => Some(5),
            RecordKind::User => None,
        }
    }

    /// Singular label used in response messages
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Item => "Item",
            RecordKind::User => "User",
        }
    }

    /// Plural label used in response messages
    pub fn plural_label(&self) -> &'static str {
        match self {
            RecordKind::Item => "Items",
            RecordKind::User => "Users",
        }
    }
}

/// A persisted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    pub id: i64,
    pub name: String,
    pub secondary: Option<String>,
}

impl Record {
    /// Apply a partial update in place
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(secondary) = patch.secondary {
            self.secondary = secondary;
        }
    }

    /// Value of the given sort column, compared the way SQLite orders it
    /// (NULL sorts before any text).
    fn compare_by(&self, other: &Record, field: SortField) -> Ordering {
        match field {
            SortField::Id => self.id.cmp(&other.id),
            SortField::Name => self.name.cmp(&other.name),
            SortField::Secondary => self.secondary.cmp(&other.secondary),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry(self.kind.secondary_field(), &self.secondary)?;
        map.end()
    }
}

/// Fields for a record about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub secondary: Option<String>,
}

/// Partial update. `None` leaves a field untouched; for the secondary
/// attribute `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub secondary: Option<Option<String>>,
}

/// Columns a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Secondary,
}

impl SortField {
    /// Resolve a requested field name. Anything that is not a column of
    /// `kind` falls back to `id`.
    pub fn resolve(kind: RecordKind, requested: &str) -> Self {
        match requested {
            "name" => SortField::Name,
            field if field == kind.secondary_field() => SortField::Secondary,
            _ => SortField::Id,
        }
    }

    /// Column name in the backing table
    pub fn column(&self, kind: RecordKind) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Secondary => kind.secondary_field(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` (any case) is descending, everything else ascending
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A resolved listing request: filter, then sort, then paginate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Substring match on `name`, folding ASCII letters only (as SQLite's
    /// `LOWER` and `LIKE` do)
    pub name_filter: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    /// 1-based page number
    pub page: u32,
    /// `None` returns every match on a single page
    pub per_page: Option<u32>,
}

impl ListQuery {
    /// Unfiltered, id-ordered, unpaginated listing
    pub fn all() -> Self {
        Self {
            name_filter: None,
            sort: SortField::Id,
            order: SortOrder::Asc,
            page: 1,
            per_page: None,
        }
    }

    /// Whether `name` passes the substring filter
    pub fn matches(&self, name: &str) -> bool {
        match &self.name_filter {
            Some(needle) => name
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
            None => true,
        }
    }

    /// Order two records by the requested column, ties broken by id
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let primary = match self.order {
            SortOrder::Asc => a.compare_by(b, self.sort),
            SortOrder::Desc => b.compare_by(a, self.sort),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// `LIKE` pattern for the name filter, with wildcards in the needle
    /// escaped. Case is left alone; the query folds both sides with `LOWER`.
    pub fn like_pattern(&self) -> Option<String> {
        self.name_filter.as_ref().map(|needle| {
            let mut pattern = String::with_capacity(needle.len() + 2);
            pattern.push('%');
            for c in needle.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }

    /// Rows to skip and rows to take, if the listing is paginated
    pub fn window(&self) -> Option<(u64, u32)> {
        self.per_page.map(|per_page| {
            let offset = u64::from(self.page.saturating_sub(1)) * u64::from(per_page);
            (offset, per_page)
        })
    }

    /// Number of pages needed for `total_items` matches
    pub fn total_pages(&self, total_items: u64) -> u64 {
        match self.per_page {
            _ if total_items == 0 => 0,
            Some(per_page) if per_page > 0 => total_items.div_ceil(u64::from(per_page)),
            _ => 1,
        }
    }
}

/// One page of a listing along with the filtered match count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<Record>,
    pub total_items: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, description: Option<&str>) -> Record {
        Record {
            kind: RecordKind::Item,
            id,
            name: name.to_string(),
            secondary: description.map(str::to_string),
        }
    }

    #[test]
    fn test_record_serializes_kind_specific_field() {
        let json = serde_json::to_value(item(1, "Apple", None)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "Apple", "description": null}));

        let user = Record {
            kind: RecordKind::User,
            id: 7,
            name: "Ankush".to_string(),
            secondary: Some("ankush@test.com".to_string()),
        };
        let json = serde_json::to_value(user).unwrap();
        assert_eq!(json["email"], "ankush@test.com");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut record = item(1, "Old", Some("keep me"));
        record.apply(RecordPatch {
            name: Some("New".to_string()),
            secondary: None,
        });
        assert_eq!(record.name, "New");
        assert_eq!(record.secondary.as_deref(), Some("keep me"));

        record.apply(RecordPatch {
            name: None,
            secondary: Some(None),
        });
        assert_eq!(record.name, "New");
        assert_eq!(record.secondary, None);
    }

    #[test]
    fn test_sort_field_falls_back_to_id() {
        assert_eq!(SortField::resolve(RecordKind::Item, "name"), SortField::Name);
        assert_eq!(SortField::resolve(RecordKind::Item, "description"), SortField::Secondary);
        assert_eq!(SortField::resolve(RecordKind::Item, "email"), SortField::Id);
        assert_eq!(SortField::resolve(RecordKind::User, "email"), SortField::Secondary);
        assert_eq!(SortField::resolve(RecordKind::User, "drop table"), SortField::Id);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("sideways"), SortOrder::Asc);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let query = ListQuery {
            name_filter: Some("APP".to_string()),
            ..ListQuery::all()
        };
        assert!(query.matches("Apple"));
        assert!(query.matches("pineapple"));
        assert!(!query.matches("Banana"));
    }

    #[test]
    fn test_filter_folds_ascii_only() {
        let query = ListQuery {
            name_filter: Some("ÉCOLE".to_string()),
            ..ListQuery::all()
        };
        assert!(query.matches("ÉCOLE"));
        assert!(query.matches("Écoles"));
        assert!(!query.matches("école"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let query = ListQuery {
            name_filter: Some("50%_Off".to_string()),
            ..ListQuery::all()
        };
        assert_eq!(query.like_pattern().unwrap(), "%50\\%\\_Off%");
        assert_eq!(ListQuery::all().like_pattern(), None);
    }

    #[test]
    fn test_window_and_total_pages() {
        let query = ListQuery {
            page: 3,
            per_page: Some(5),
            ..ListQuery::all()
        };
        assert_eq!(query.window(), Some((10, 5)));
        assert_eq!(query.total_pages(0), 0);
        assert_eq!(query.total_pages(5), 1);
        assert_eq!(query.total_pages(11), 3);

        let unpaged = ListQuery::all();
        assert_eq!(unpaged.window(), None);
        assert_eq!(unpaged.total_pages(42), 1);
    }

    #[test]
    fn test_compare_breaks_ties_by_id() {
        let query = ListQuery {
            sort: SortField::Name,
            order: SortOrder::Desc,
            ..ListQuery::all()
        };
        let a = item(1, "Same", None);
        let b = item(2, "Same", None);
        let c = item(3, "Zed", None);
        let mut rows = vec![b.clone(), c.clone(), a.clone()];
        rows.sort_by(|x, y| query.compare(x, y));
        assert_eq!(rows, vec![c, a, b]);
    }
}
