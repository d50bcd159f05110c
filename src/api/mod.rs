pub mod admin;
pub mod public;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::logging::logging_middleware;
use crate::render::Templates;
use admin::admin_api_router;
use public::public_api_router;

pub fn create_api_router(
    shared_db: Arc<DatabaseConnection>,
    config: Arc<Config>,
    templates: Arc<Templates>,
) -> Router {
    let mut router = Router::new().merge(public_api_router(
        shared_db.clone(),
        config.clone(),
        templates,
    ));

    if config.admin_enabled {
        router = router.nest("/admin/api", admin_api_router(shared_db, config));
    }

    router
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
