use std::error::Error;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shop_catalog::config::Config;
use shop_catalog::entities::setup_schema;
use shop_catalog::{build_app, connect};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let db = connect(&config).await?;
    setup_schema(&db).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, admin = config.admin_enabled, "catalog listening");

    let app = build_app(Arc::new(db), Arc::new(config))?;
    axum::serve(listener, app).await?;

    Ok(())
}
