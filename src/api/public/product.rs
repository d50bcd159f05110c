use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::Html,
    routing::get,
    Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;

use crate::catalog;
use crate::entities::{category, product, product_image, product_size::SizeStock};
use crate::middleware::logging::ApiError;
use crate::render::{is_partial, Page, Templates};

pub fn product_router(db: Arc<DatabaseConnection>, templates: Arc<Templates>) -> Router {
    Router::new()
        .route("/product/:slug", get(get_product))
        .route("/product/:slug/", get(get_product))
        .layer(Extension(db))
        .layer(Extension(templates))
}

async fn get_product(
    headers: HeaderMap,
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(templates): Extension<Arc<Templates>>,
) -> Result<Html<String>, ApiError> {
    let txn = db.begin().await?;
    let detail = catalog::product_detail(&txn, &slug).await?;
    let categories = catalog::categories(&txn).await?;
    txn.commit().await?;

    let context = ProductContext {
        current_category: detail.category.slug.clone(),
        product: detail.product,
        category: detail.category,
        images: detail.images,
        sizes: detail.sizes,
        related_products: detail.related,
        categories,
    };
    templates.render_page(is_partial(&headers), Page::ProductDetail, &context)
}

#[derive(Serialize)]
struct ProductContext {
    product: product::Model,
    category: category::Model,
    images: Vec<product_image::Model>,
    sizes: Vec<SizeStock>,
    related_products: Vec<product::Model>,
    categories: Vec<category::Model>,
    current_category: String,
}
