#![allow(dead_code)]

use reqwest::Client;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

use shop_catalog::catalog::slug::slugify;
use shop_catalog::config::Config;
use shop_catalog::entities::{category, product, product_image, product_size, setup_schema, size};
use shop_catalog::{build_app, connect};

/// File limit used by the test server, small enough to trip with a few KiB.
pub const TEST_FILE_SIZE_LIMIT: usize = 4 * 1024;

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub db: Arc<DatabaseConnection>,
    pub media_root: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        database_url: format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("catalog.db").display()
        ),
        max_connections: Some(1),
        bind_addr: "127.0.0.1:0".to_owned(),
        media_root: dir.path().join("media"),
        file_size_limit: TEST_FILE_SIZE_LIMIT,
        admin_enabled: true,
    }
}

/// A fresh database in its own temporary directory.
pub async fn test_db() -> (DatabaseConnection, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = connect(&test_config(&dir))
        .await
        .expect("Failed to connect to test database");
    setup_schema(&db).await.expect("Failed to create schema");

    (db, dir)
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Serves the whole application on an ephemeral port.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = test_config(&dir);
    configure(&mut config);

    let db = connect(&config)
        .await
        .expect("Failed to connect to test database");
    setup_schema(&db).await.expect("Failed to create schema");
    let db = Arc::new(db);

    let media_root = config.media_root.clone();
    let app = build_app(db.clone(), Arc::new(config)).expect("Failed to build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: Client::new(),
        db,
        media_root,
        _dir: dir,
    }
}

pub async fn seed_category(db: &DatabaseConnection, name: &str) -> category::Model {
    category::ActiveModel {
        name: Set(name.to_owned()),
        slug: Set(slugify(name)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed category")
}

pub async fn seed_size(db: &DatabaseConnection, name: &str) -> size::Model {
    size::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed size")
}

pub async fn seed_product(
    db: &DatabaseConnection,
    category: &category::Model,
    name: &str,
    price: &str,
    color: &str,
) -> product::Model {
    product::ActiveModel {
        name: Set(name.to_owned()),
        category_id: Set(category.id),
        slug: Set(slugify(name)),
        price: Set(Decimal::from_str(price).expect("Bad test price")),
        description: Set(format!("{name} description")),
        main_image: Set(format!("images/{}.jpg", slugify(name))),
        color: Set(color.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed product")
}

pub async fn seed_stock(
    db: &DatabaseConnection,
    product: &product::Model,
    size: &size::Model,
    stock: u32,
) -> product_size::Model {
    product_size::ActiveModel {
        product_id: Set(product.id),
        size_id: Set(size.id),
        stock: Set(stock),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed stock")
}

pub async fn seed_image(
    db: &DatabaseConnection,
    product: &product::Model,
    path: &str,
) -> product_image::Model {
    product_image::ActiveModel {
        product_id: Set(product.id),
        product_image: Set(path.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed image")
}

/// Two categories, two sizes and a handful of products:
///
/// | product          | category | price | color | sizes      |
/// |------------------|----------|-------|-------|------------|
/// | Red Runner       | Shoes    | 49.99 | Red   | Large (3)  |
/// | Blue Trail       | Shoes    | 79.00 | Blue  | Small (2)  |
/// | Red Cap          | Hats     | 19.50 | red   |            |
/// | 100% Wool Beanie | Hats     | 25.00 | Grey  | Large (0)  |
pub struct Storefront {
    pub shoes: category::Model,
    pub hats: category::Model,
    pub large: size::Model,
    pub small: size::Model,
    pub red_runner: product::Model,
    pub blue_trail: product::Model,
    pub red_cap: product::Model,
    pub beanie: product::Model,
}

pub async fn seed_storefront(db: &DatabaseConnection) -> Storefront {
    let shoes = seed_category(db, "Shoes").await;
    let hats = seed_category(db, "Hats").await;
    let large = seed_size(db, "Large").await;
    let small = seed_size(db, "Small").await;

    let red_runner = seed_product(db, &shoes, "Red Runner", "49.99", "Red").await;
    let blue_trail = seed_product(db, &shoes, "Blue Trail", "79.00", "Blue").await;
    let red_cap = seed_product(db, &hats, "Red Cap", "19.50", "red").await;
    let beanie = seed_product(db, &hats, "100% Wool Beanie", "25.00", "Grey").await;

    seed_stock(db, &red_runner, &large, 3).await;
    seed_stock(db, &blue_trail, &small, 2).await;
    seed_stock(db, &beanie, &large, 0).await;

    Storefront {
        shoes,
        hats,
        large,
        small,
        red_runner,
        blue_trail,
        red_cap,
        beanie,
    }
}
