use axum::{
    extract::{Extension, Path, Query},
    http::HeaderMap,
    response::Html,
    routing::get,
    Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::catalog::{self, CatalogQuery, FilterParams};
use crate::entities::{category, product, size};
use crate::middleware::logging::ApiError;
use crate::render::{catalog_fragment, is_partial, Page, Templates};

pub fn catalog_router(db: Arc<DatabaseConnection>, templates: Arc<Templates>) -> Router {
    Router::new()
        .route("/catalog", get(catalog_all))
        .route("/catalog/", get(catalog_all))
        .route("/catalog/:category_slug", get(catalog_in_category))
        .route("/catalog/:category_slug/", get(catalog_in_category))
        .layer(Extension(db))
        .layer(Extension(templates))
}

async fn catalog_all(
    headers: HeaderMap,
    Query(query): Query<CatalogQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(templates): Extension<Arc<Templates>>,
) -> Result<Html<String>, ApiError> {
    render_catalog(&headers, None, &query, &db, &templates).await
}

async fn catalog_in_category(
    headers: HeaderMap,
    Path(category_slug): Path<String>,
    Query(query): Query<CatalogQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(templates): Extension<Arc<Templates>>,
) -> Result<Html<String>, ApiError> {
    render_catalog(&headers, Some(&category_slug), &query, &db, &templates).await
}

async fn render_catalog(
    headers: &HeaderMap,
    category_slug: Option<&str>,
    query: &CatalogQuery,
    db: &DatabaseConnection,
    templates: &Templates,
) -> Result<Html<String>, ApiError> {
    let txn = db.begin().await?;
    let listing = catalog::resolve(&txn, category_slug, query).await?;
    let categories = catalog::categories(&txn).await?;
    let sizes = catalog::sizes(&txn).await?;
    txn.commit().await?;

    let intent = listing.intent;
    let context = CatalogContext {
        search_query: listing.params.q.clone(),
        products: listing.products,
        filter_params: listing.params,
        current_category: listing.category.map(|category| category.slug),
        categories,
        sizes,
        show_search: intent.show_search,
        reset_search: intent.reset_search && !intent.show_search,
    };

    if !is_partial(headers) {
        return templates.render_page(false, Page::Catalog, &context);
    }

    match catalog_fragment(intent) {
        Page::SearchButton => templates.render(Page::SearchButton, &json!({})),
        fragment => templates.render(fragment, &context),
    }
}

#[derive(Serialize)]
struct CatalogContext {
    products: Vec<product::Model>,
    filter_params: FilterParams,
    current_category: Option<String>,
    categories: Vec<category::Model>,
    sizes: Vec<size::Model>,
    search_query: String,
    show_search: bool,
    reset_search: bool,
}
