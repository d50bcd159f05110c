use axum::{extract::Extension, http::HeaderMap, response::Html, routing::get, Router};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;

use crate::catalog;
use crate::entities::category;
use crate::middleware::logging::ApiError;
use crate::render::{is_partial, Page, Templates};

pub fn home_router(db: Arc<DatabaseConnection>, templates: Arc<Templates>) -> Router {
    Router::new()
        .route("/", get(home))
        .layer(Extension(db))
        .layer(Extension(templates))
}

async fn home(
    headers: HeaderMap,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(templates): Extension<Arc<Templates>>,
) -> Result<Html<String>, ApiError> {
    let txn = db.begin().await?;
    let categories = catalog::categories(&txn).await?;
    txn.commit().await?;

    let context = HomeContext {
        categories,
        current_category: None,
    };
    templates.render_page(is_partial(&headers), Page::HomeContent, &context)
}

#[derive(Serialize)]
struct HomeContext {
    categories: Vec<category::Model>,
    current_category: Option<String>,
}
