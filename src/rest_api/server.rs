//! # REST API Routes
//!
//! Axum routes for one record collection:
//!
//! - `POST   <path>`      create
//! - `GET    <path>`      list
//! - `PUT    <path>/:id`  update
//! - `DELETE <path>/:id`  delete
//!
//! Any other method on these paths gets a 405 error envelope.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;

use crate::record::{Record, RecordKind};

use super::errors::{ApiError, ApiResult};
use super::handler::RecordService;
use super::response::{Envelope, ListEnvelope};

/// Per-collection router state
pub struct ResourceState {
    pub kind: RecordKind,
    pub service: RecordService,
}

type SharedState = Arc<ResourceState>;

/// Build the router serving `kind`'s collection path
pub fn record_routes(kind: RecordKind, service: RecordService) -> Router {
    let state = Arc::new(ResourceState { kind, service });
    let collection = kind.collection_path();
    let member = format!("{}/:id", collection);

    Router::new()
        .route(
            collection,
            get(list_handler)
                .post(create_handler)
                .fallback(method_not_allowed),
        )
        .route(
            &member,
            put(update_handler)
                .delete(delete_handler)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Non-integer ids never match a record route
fn record_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id).map_err(|_| ApiError::RouteNotFound)
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

async fn create_handler(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Record>>), ApiError> {
    let body = json_body(body)?;
    let envelope = state.service.create(state.kind, &body).await?;
    Ok((StatusCode::CREATED, Json(envelope)))
}

async fn list_handler(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListEnvelope<Record>>, ApiError> {
    let envelope = state.service.list(state.kind, &params).await?;
    Ok(Json(envelope))
}

async fn update_handler(
    State(state): State<SharedState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<Record>>, ApiError> {
    let id = record_id(path)?;
    let current = state.service.find(state.kind, id).await?;
    let body = json_body(body)?;
    let envelope = state.service.update(current, &body).await?;
    Ok(Json(envelope))
}

async fn delete_handler(
    State(state): State<SharedState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = record_id(path)?;
    let envelope = state.service.delete(state.kind, id).await?;
    Ok(Json(envelope))
}
