pub mod api;
pub mod catalog;
pub mod config;
pub mod entities;
pub mod middleware;
pub mod render;

use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::api::create_api_router;
use crate::config::Config;
use crate::render::Templates;

pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    if let Some(max_connections) = config.max_connections {
        options.max_connections(max_connections);
    }
    options.sqlx_logging(false);

    Database::connect(options).await
}

/// The full application: storefront pages, media and (when enabled) the
/// management API.
pub fn build_app(
    db: Arc<DatabaseConnection>,
    config: Arc<Config>,
) -> Result<Router, minijinja::Error> {
    let templates = Arc::new(Templates::new()?);
    Ok(create_api_router(db, config, templates))
}
