use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use service::{Fields, Record, RecordStore};
use tracing::info;

use crate::errors::JsonApiError;

/// `GET /{resource}`, `POST /{resource}`, `PUT /{resource}/{id}`,
/// `DELETE /{resource}/{id}` for one store. Nest it under the resource segment.
pub fn resource_router(store: Arc<RecordStore>) -> Router {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/:id", put(update_record).delete(delete_record))
        .with_state(store)
}

#[utoipa::path(
    get, path = "/{resource}", tag = "records",
    params(("resource" = String, Path, description = "users | roles | permissions")),
    responses((status = 200, description = "Whole collection", body = [crate::openapi::RecordDoc]))
)]
pub async fn list_records(State(store): State<Arc<RecordStore>>) -> Json<Vec<Record>> {
    let records = store.list().await;
    info!(resource = %store.resource(), count = records.len(), "list records");
    Json(records)
}

#[utoipa::path(
    post, path = "/{resource}", tag = "records",
    params(("resource" = String, Path, description = "users | roles | permissions")),
    request_body = crate::openapi::RecordFieldsDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::RecordDoc),
        (status = 422, description = "Body is not a JSON object"),
        (status = 500, description = "Storage Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_record(
    State(store): State<Arc<RecordStore>>,
    Json(fields): Json<Fields>,
) -> Result<(StatusCode, Json<Record>), JsonApiError> {
    let record = store.create(fields).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put, path = "/{resource}/{id}", tag = "records",
    params(
        ("resource" = String, Path, description = "users | roles | permissions"),
        ("id" = i64, Path, description = "Record id")
    ),
    request_body = crate::openapi::RecordFieldsDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::RecordDoc),
        (status = 400, description = "Id is not an integer"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Storage Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update_record(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<i64>,
    Json(patch): Json<Fields>,
) -> Result<Json<Record>, JsonApiError> {
    store.update(id, patch).await.map(Json).map_err(JsonApiError::from)
}

#[utoipa::path(
    delete, path = "/{resource}/{id}", tag = "records",
    params(
        ("resource" = String, Path, description = "users | roles | permissions"),
        ("id" = i64, Path, description = "Record id")
    ),
    responses(
        (status = 204, description = "Deleted, or nothing to delete"),
        (status = 500, description = "Storage Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete_record(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, JsonApiError> {
    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
