pub mod category;
pub mod product;
pub mod registry;
pub mod size;
pub mod upload;

use axum::Router;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};
use std::sync::Arc;

use crate::catalog::slug::{slug_taken, unique_slug};
use crate::config::Config;
use crate::middleware::logging::ApiError;
use category::admin_category_router;
use product::admin_product_router;
use registry::registry_router;
use size::admin_size_router;
use upload::upload_router;

pub fn admin_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let registry_router = registry_router();
    let admin_category_router = admin_category_router(db.clone());
    let admin_size_router = admin_size_router(db.clone());
    let admin_product_router = admin_product_router(db.clone());
    let upload_router = upload_router(config);

    Router::new()
        .merge(registry_router)
        .merge(admin_category_router)
        .merge(admin_size_router)
        .merge(admin_product_router)
        .merge(upload_router)
}

/// Slug for a new row: the explicit one when given (it must be free),
/// otherwise one derived from `name`.
async fn assign_slug<E, C>(
    db: &C,
    column: E::Column,
    explicit: Option<String>,
    name: &str,
    fallback: &str,
) -> Result<String, ApiError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    match explicit {
        Some(slug) => {
            ensure_slug_free::<E, C>(db, column, &slug).await?;
            Ok(slug)
        }
        None => Ok(unique_slug::<E, C>(db, column, name, fallback).await?),
    }
}

async fn ensure_slug_free<E, C>(db: &C, column: E::Column, slug: &str) -> Result<(), ApiError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if slug_taken::<E, C>(db, column, slug).await? {
        return Err(ApiError::Conflict(format!("Slug {slug:?} is already in use.")));
    }
    Ok(())
}

fn not_found(resource: &str, id: i32) -> ApiError {
    ApiError::NotFound(format!("No {resource} with {id} id was found."))
}
