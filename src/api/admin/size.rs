use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::not_found;
use crate::entities::size::{self, Entity as SizeEntity};
use crate::middleware::logging::ApiError;

pub fn admin_size_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/sizes", get(list_sizes).post(create_size))
        .route("/sizes/:id", patch(patch_size).delete(delete_size))
        .layer(Extension(db))
}

async fn list_sizes(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<size::Model>>, ApiError> {
    let sizes = SizeEntity::find()
        .order_by_asc(size::Column::Id)
        .all(db.as_ref())
        .await?;

    Ok(Json(sizes))
}

async fn create_size(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<SizePayload>,
) -> Result<(StatusCode, Json<size::Model>), ApiError> {
    payload.validate()?;

    let created = size::ActiveModel {
        name: Set(payload.name),
        ..Default::default()
    }
    .insert(db.as_ref())
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn patch_size(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<SizePayload>,
) -> Result<Json<size::Model>, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let mut size: size::ActiveModel = SizeEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found("size", id))?
        .into();
    size.name = Set(payload.name);

    let updated = size.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(updated))
}

/// Removes the size together with every stock row that uses it.
async fn delete_size(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<StatusCode, ApiError> {
    let txn = db.begin().await?;
    let size = SizeEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found("size", id))?;

    size.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize, Validate, Debug)]
struct SizePayload {
    #[validate(length(min = 1, max = 100))]
    name: String,
}
