pub mod catalog;
pub mod home;
pub mod media;
pub mod product;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::render::Templates;
use catalog::catalog_router;
use home::home_router;
use media::media_router;
use product::product_router;

pub fn public_api_router(
    db: Arc<DatabaseConnection>,
    config: Arc<Config>,
    templates: Arc<Templates>,
) -> Router {
    let home_router = home_router(db.clone(), templates.clone());
    let catalog_router = catalog_router(db.clone(), templates.clone());
    let product_router = product_router(db.clone(), templates);
    let media_router = media_router(config);

    Router::new()
        .merge(home_router)
        .merge(catalog_router)
        .merge(product_router)
        .merge(media_router)
}
