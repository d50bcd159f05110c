use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::{assign_slug, ensure_slug_free, not_found};
use crate::catalog::slug::SLUG_REGEX;
use crate::entities::category::{self, Entity as CategoryEntity};
use crate::middleware::logging::ApiError;

//ROUTERS
pub fn admin_category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(admin_get_category)
                .patch(patch_category)
                .delete(delete_category),
        )
        .layer(Extension(db))
}

//ROUTES
async fn list_categories(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<category::Model>>, ApiError> {
    let categories = CategoryEntity::find()
        .order_by_asc(category::Column::Name)
        .all(db.as_ref())
        .await?;

    Ok(Json(categories))
}

async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateCategory>,
) -> Result<(StatusCode, Json<category::Model>), ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let slug = assign_slug::<CategoryEntity, _>(
        &txn,
        category::Column::Slug,
        payload.slug,
        &payload.name,
        "category",
    )
    .await?;

    let created = category::ActiveModel {
        name: Set(payload.name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn admin_get_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Json<category::Model>, ApiError> {
    CategoryEntity::find_by_id(id)
        .one(db.as_ref())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("category", id))
}

/// Renaming keeps the stored slug; only an explicit `slug` changes it.
async fn patch_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCategory>,
) -> Result<Json<category::Model>, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let current = CategoryEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found("category", id))?;

    let mut category: category::ActiveModel = current.clone().into();
    if let Some(name) = payload.name {
        category.name = Set(name);
    }
    if let Some(slug) = payload.slug.filter(|slug| *slug != current.slug) {
        ensure_slug_free::<CategoryEntity, _>(&txn, category::Column::Slug, &slug).await?;
        category.slug = Set(slug);
    }

    let updated = category.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(updated))
}

/// Deleting a category deletes its products and their inline rows.
async fn delete_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<StatusCode, ApiError> {
    let txn = db.begin().await?;
    let category = CategoryEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found("category", id))?;

    category.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

//Struct
#[derive(Deserialize, Validate, Debug)]
struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
}

#[derive(Deserialize, Validate, Debug)]
struct PatchCategory {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
}
