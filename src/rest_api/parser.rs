//! # Request Parser
//!
//! Turns list query parameters and JSON bodies into record-layer types.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::record::{ListQuery, NewRecord, RecordKind, RecordPatch, SortField, SortOrder};

use super::errors::{ApiError, ApiResult};

/// Page returned when none is requested
pub const DEFAULT_PAGE: u32 = 1;

/// Largest accepted page size
pub const MAX_PER_PAGE: u32 = 100;

/// Build a listing query from `page`, `per_page`, `sort_by`, `order` and
/// `name`. Unknown parameters are ignored.
pub fn parse_list_query(
    kind: RecordKind,
    params: &HashMap<String, String>,
) -> ApiResult<ListQuery> {
    let per_page = match params.get("per_page") {
        Some(value) => match parse_int("per_page", value)? {
            n if n < 1 => kind.default_per_page(),
            n => Some(u32::try_from(n).unwrap_or(u32::MAX).min(MAX_PER_PAGE)),
        },
        None => kind.default_per_page(),
    };

    // Unpaginated listings only ever have one page
    let page = match (params.get("page"), per_page) {
        (Some(value), Some(_)) => {
            let n = parse_int("page", value)?.max(1);
            u32::try_from(n).unwrap_or(u32::MAX)
        }
        (Some(value), None) => {
            parse_int("page", value)?;
            DEFAULT_PAGE
        }
        (None, _) => DEFAULT_PAGE,
    };

    let sort = params
        .get("sort_by")
        .map(|field| SortField::resolve(kind, field))
        .unwrap_or(SortField::Id);

    let order = params
        .get("order")
        .map(|value| SortOrder::parse(value))
        .unwrap_or(SortOrder::Asc);

    let name_filter = params
        .get("name")
        .filter(|value| !value.is_empty())
        .cloned();

    Ok(ListQuery {
        name_filter,
        sort,
        order,
        page,
        per_page,
    })
}

fn parse_int(param: &str, value: &str) -> ApiResult<i64> {
    value.trim().parse().map_err(|_| {
        ApiError::InvalidQueryParam(format!("{} must be an integer, got '{}'", param, value))
    })
}

/// Message returned when a create request lacks a required field
pub fn required_fields_message(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Item => "Name is required",
        RecordKind::User => "Name and Email are required",
    }
}

/// Validate a create body
pub fn parse_new_record(kind: RecordKind, body: &Value) -> ApiResult<NewRecord> {
    let object = as_object(body)?;
    let missing = || ApiError::Validation(required_fields_message(kind).to_string());

    let name = non_empty_string(object, "name").ok_or_else(missing)?;

    let secondary_field = kind.secondary_field();
    let secondary = if kind.secondary_required() {
        Some(non_empty_string(object, secondary_field).ok_or_else(missing)?)
    } else {
        optional_string(object, secondary_field)?.flatten()
    };

    Ok(NewRecord { name, secondary })
}

/// Validate an update body. Only keys present in the body end up in the
/// patch.
pub fn parse_patch(kind: RecordKind, body: &Value) -> ApiResult<RecordPatch> {
    let object = as_object(body)?;

    let name = match object.get("name") {
        None => None,
        Some(_) => Some(non_empty_string(object, "name").ok_or_else(|| {
            ApiError::Validation("name must be a non-empty string".to_string())
        })?),
    };

    let secondary_field = kind.secondary_field();
    let secondary = if kind.secondary_required() {
        match object.get(secondary_field) {
            None => None,
            Some(_) => Some(Some(non_empty_string(object, secondary_field).ok_or_else(
                || ApiError::Validation(format!("{} must be a non-empty string", secondary_field)),
            )?)),
        }
    } else {
        optional_string(object, secondary_field)?
    };

    Ok(RecordPatch { name, secondary })
}

fn as_object(body: &Value) -> ApiResult<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| ApiError::InvalidBody("expected a JSON object".to_string()))
}

fn non_empty_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `None` if absent, `Some(None)` if null, `Some(Some(..))` if a string
fn optional_string(object: &Map<String, Value>, key: &str) -> ApiResult<Option<Option<String>>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(ApiError::Validation(format!(
            "{} must be a string or null",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_item_list_defaults() {
        let query = parse_list_query(RecordKind::Item, &HashMap::new()).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, Some(5));
        assert_eq!(query.sort, SortField::Id);
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.name_filter, None);
    }

    #[test]
    fn test_user_list_is_unpaginated_by_default() {
        let query = parse_list_query(RecordKind::User, &params(&[("page", "4")])).unwrap();
        assert_eq!(query.per_page, None);
        assert_eq!(query.page, 1);

        let query = parse_list_query(RecordKind::User, &params(&[("per_page", "2")])).unwrap();
        assert_eq!(query.per_page, Some(2));
    }

    #[test]
    fn test_full_list_params() {
        let query = parse_list_query(
            RecordKind::Item,
            &params(&[
                ("page", "2"),
                ("per_page", "10"),
                ("sort_by", "name"),
                ("order", "desc"),
                ("name", "app"),
            ]),
        )
        .unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, Some(10));
        assert_eq!(query.sort, SortField::Name);
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.name_filter.as_deref(), Some("app"));
    }

    #[test]
    fn test_list_params_are_clamped() {
        let query = parse_list_query(
            RecordKind::Item,
            &params(&[("page", "-3"), ("per_page", "100000"), ("name", "")]),
        )
        .unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, Some(MAX_PER_PAGE));
        assert_eq!(query.name_filter, None);

        let query = parse_list_query(RecordKind::Item, &params(&[("per_page", "0")])).unwrap();
        assert_eq!(query.per_page, Some(5));
    }

    #[test]
    fn test_non_integer_page_is_rejected() {
        let err = parse_list_query(RecordKind::Item, &params(&[("page", "two")])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidQueryParam(_)));
    }

    #[test]
    fn test_unknown_sort_falls_back_to_id() {
        let query =
            parse_list_query(RecordKind::Item, &params(&[("sort_by", "password")])).unwrap();
        assert_eq!(query.sort, SortField::Id);
    }

    #[test]
    fn test_item_create_requires_name() {
        let err = parse_new_record(RecordKind::Item, &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Name is required");

        let err = parse_new_record(RecordKind::Item, &json!({"name": ""})).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let record = parse_new_record(RecordKind::Item, &json!({"name": "Lamp"})).unwrap();
        assert_eq!(record.name, "Lamp");
        assert_eq!(record.secondary, None);
    }

    #[test]
    fn test_user_create_requires_email() {
        let err = parse_new_record(RecordKind::User, &json!({"name": "Ankush"})).unwrap_err();
        assert_eq!(err.to_string(), "Name and Email are required");

        let record = parse_new_record(
            RecordKind::User,
            &json!({"name": "Ankush", "email": "ankush@test.com"}),
        )
        .unwrap();
        assert_eq!(record.secondary.as_deref(), Some("ankush@test.com"));
    }

    #[test]
    fn test_create_rejects_non_object_body() {
        let err = parse_new_record(RecordKind::Item, &json!(["name"])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)));
    }

    #[test]
    fn test_patch_keeps_absent_fields_absent() {
        let patch = parse_patch(RecordKind::Item, &json!({"name": "New"})).unwrap();
        assert_eq!(patch.name.as_deref(), Some("New"));
        assert_eq!(patch.secondary, None);

        let patch = parse_patch(RecordKind::Item, &json!({"description": null})).unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.secondary, Some(None));

        let patch = parse_patch(RecordKind::Item, &json!({})).unwrap();
        assert_eq!(patch, RecordPatch::default());
    }

    #[test]
    fn test_patch_validates_present_fields() {
        assert!(parse_patch(RecordKind::Item, &json!({"name": ""})).is_err());
        assert!(parse_patch(RecordKind::Item, &json!({"description": 3})).is_err());
        assert!(parse_patch(RecordKind::User, &json!({"email": null})).is_err());
    }
}
