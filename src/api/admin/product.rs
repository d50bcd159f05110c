use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

use super::{assign_slug, ensure_slug_free, not_found};
use crate::catalog::{self, slug::SLUG_REGEX};
use crate::entities::{
    category,
    product::{self, Entity as ProductEntity},
    product_image,
    product_size::{self, SizeStock},
    size,
};
use crate::middleware::logging::ApiError;

/// Prices are stored as DECIMAL(10, 2).
const MAX_PRICE_SCALE: u32 = 2;
const MAX_PRICE_INTEGER: i64 = 100_000_000;

//ROUTERS
pub fn admin_product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(admin_get_product)
                .patch(patch_product)
                .delete(delete_product),
        )
        .route("/products/:id/images", post(add_image))
        .route("/products/:id/images/:image_id", delete(remove_image))
        .route(
            "/products/:id/sizes/:size_id",
            put(put_stock).delete(remove_stock),
        )
        .layer(Extension(db))
}

//ROUTES
async fn list_products(
    Query(query): Query<ProductListQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<ProductRow>>, ApiError> {
    let mut select = ProductEntity::find();
    if let Some(name) = query.name {
        select = select.filter(product::Column::Name.eq(name));
    }
    if let Some(color) = query.color {
        select = select.filter(product::Column::Color.eq(color));
    }

    let rows = select
        .find_also_related(category::Entity)
        .order_by_asc(product::Column::Name)
        .all(db.as_ref())
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(product, category)| ProductRow::new(product, category))
            .collect(),
    ))
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<ProductView>), ApiError> {
    payload.validate()?;
    check_price(payload.price)?;
    check_image_paths(&payload.images)?;

    let mut seen = HashSet::new();
    if let Some(stock) = payload.sizes.iter().find(|stock| !seen.insert(stock.size_id)) {
        return Err(ApiError::ValidationFail(format!(
            "Size {} is listed more than once.",
            stock.size_id
        )));
    }

    let txn = db.begin().await?;
    ensure_category(&txn, payload.category_id).await?;
    for stock in &payload.sizes {
        ensure_size(&txn, stock.size_id).await?;
    }

    let slug = assign_slug::<ProductEntity, _>(
        &txn,
        product::Column::Slug,
        payload.slug,
        &payload.name,
        "product",
    )
    .await?;

    let created = product::ActiveModel {
        name: Set(payload.name),
        category_id: Set(payload.category_id),
        slug: Set(slug),
        price: Set(payload.price),
        description: Set(payload.description),
        main_image: Set(payload.main_image),
        color: Set(payload.color),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for path in payload.images {
        product_image::ActiveModel {
            product_id: Set(created.id),
            product_image: Set(path),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for stock in payload.sizes {
        product_size::ActiveModel {
            product_id: Set(created.id),
            size_id: Set(stock.size_id),
            stock: Set(stock_level(stock.stock)?),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    let view = ProductView::load(&txn, created).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(view)))
}

async fn admin_get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Json<ProductView>, ApiError> {
    let txn = db.begin().await?;
    let product = find_product(&txn, id).await?;
    let view = ProductView::load(&txn, product).await?;
    txn.commit().await?;

    Ok(Json(view))
}

/// Renaming keeps the stored slug; only an explicit `slug` changes it.
async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProduct>,
) -> Result<Json<ProductView>, ApiError> {
    payload.validate()?;
    if let Some(price) = payload.price {
        check_price(price)?;
    }

    let txn = db.begin().await?;
    let current = find_product(&txn, id).await?;
    let mut product: product::ActiveModel = current.clone().into();

    if let Some(name) = payload.name {
        product.name = Set(name);
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(&txn, category_id).await?;
        product.category_id = Set(category_id);
    }
    if let Some(slug) = payload.slug.filter(|slug| *slug != current.slug) {
        ensure_slug_free::<ProductEntity, _>(&txn, product::Column::Slug, &slug).await?;
        product.slug = Set(slug);
    }
    if let Some(price) = payload.price {
        product.price = Set(price);
    }
    if let Some(description) = payload.description {
        product.description = Set(description);
    }
    if let Some(main_image) = payload.main_image {
        product.main_image = Set(main_image);
    }
    if let Some(color) = payload.color {
        product.color = Set(color);
    }

    let updated = product.update(&txn).await?;
    let view = ProductView::load(&txn, updated).await?;
    txn.commit().await?;

    Ok(Json(view))
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<StatusCode, ApiError> {
    let txn = db.begin().await?;
    let product = find_product(&txn, id).await?;
    product.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn add_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<ImagePayload>,
) -> Result<(StatusCode, Json<product_image::Model>), ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    find_product(&txn, id).await?;
    let image = product_image::ActiveModel {
        product_id: Set(id),
        product_image: Set(payload.product_image),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(image)))
}

async fn remove_image(
    Path((id, image_id)): Path<(i32, i32)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<StatusCode, ApiError> {
    let txn = db.begin().await?;
    let image = product_image::Entity::find_by_id(image_id)
        .filter(product_image::Column::ProductId.eq(id))
        .one(&txn)
        .await?
        .ok_or_else(|| not_found("image", image_id))?;

    image.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Sets the stock held for one size, creating the row on first use so a
/// product never has two rows for the same size.
async fn put_stock(
    Path((id, size_id)): Path<(i32, i32)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<StockLevel>,
) -> Result<Json<SizeStock>, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let product = find_product(&txn, id).await?;
    let size = size::Entity::find_by_id(size_id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found("size", size_id))?;

    let stock = stock_level(payload.stock)?;
    let row = match stock_row(&txn, id, size_id).await? {
        Some(row) => {
            let mut row: product_size::ActiveModel = row.into();
            row.stock = Set(stock);
            row.update(&txn).await?
        }
        None => {
            product_size::ActiveModel {
                product_id: Set(id),
                size_id: Set(size_id),
                stock: Set(stock),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };
    txn.commit().await?;

    Ok(Json(SizeStock::new(&row, &size.name, &product.name)))
}

async fn remove_stock(
    Path((id, size_id)): Path<(i32, i32)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<StatusCode, ApiError> {
    let txn = db.begin().await?;
    let row = stock_row(&txn, id, size_id).await?.ok_or_else(|| {
        ApiError::NotFound(format!("Product {id} has no stock row for size {size_id}."))
    })?;

    row.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

//HELPERS
async fn find_product<C: ConnectionTrait>(db: &C, id: i32) -> Result<product::Model, ApiError> {
    ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found("product", id))
}

async fn ensure_category<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), ApiError> {
    match category::Entity::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::ValidationFail(format!(
            "No category with {id} id was found."
        ))),
    }
}

async fn ensure_size<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), ApiError> {
    match size::Entity::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::ValidationFail(format!("No size with {id} id was found."))),
    }
}

async fn stock_row<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    size_id: i32,
) -> Result<Option<product_size::Model>, DbErr> {
    product_size::Entity::find()
        .filter(product_size::Column::ProductId.eq(product_id))
        .filter(product_size::Column::SizeId.eq(size_id))
        .one(db)
        .await
}

fn check_price(price: Decimal) -> Result<(), ApiError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ApiError::ValidationFail("Price must not be negative.".into()));
    }
    if price.normalize().scale() > MAX_PRICE_SCALE {
        return Err(ApiError::ValidationFail(
            "Price must have at most 2 decimal places.".into(),
        ));
    }
    if price >= Decimal::new(MAX_PRICE_INTEGER, 0) {
        return Err(ApiError::ValidationFail(
            "Price must have at most 10 digits.".into(),
        ));
    }
    Ok(())
}

fn stock_level(stock: i32) -> Result<u32, ApiError> {
    u32::try_from(stock).map_err(|_| {
        ApiError::ValidationFail(format!("Stock must not be negative, got {stock}."))
    })
}

fn check_image_paths(paths: &[String]) -> Result<(), ApiError> {
    if paths.iter().any(|path| path.is_empty()) {
        return Err(ApiError::ValidationFail("Image path must not be empty.".into()));
    }
    Ok(())
}

//Struct
#[derive(Deserialize)]
struct ProductListQuery {
    name: Option<String>,
    color: Option<String>,
}

#[derive(Serialize)]
struct ProductRow {
    id: i32,
    name: String,
    category: Option<String>,
    price: Decimal,
}

impl ProductRow {
    fn new(product: product::Model, category: Option<category::Model>) -> ProductRow {
        ProductRow {
            id: product.id,
            name: product.name,
            category: category.map(|category| category.name),
            price: product.price,
        }
    }
}

/// A product with its inline image and stock rows.
#[derive(Serialize)]
struct ProductView {
    #[serde(flatten)]
    product: product::Model,
    images: Vec<product_image::Model>,
    sizes: Vec<SizeStock>,
}

impl ProductView {
    async fn load<C: ConnectionTrait>(db: &C, product: product::Model) -> Result<Self, DbErr> {
        let images = catalog::product_images(db, product.id).await?;
        let sizes = catalog::size_stock(db, &product).await?;

        Ok(ProductView {
            product,
            images,
            sizes,
        })
    }
}

#[derive(Deserialize, Validate, Debug)]
struct CreateProduct {
    #[validate(length(min = 1, max = 100))]
    name: String,
    category_id: i32,
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
    price: Decimal,
    #[serde(default)]
    #[validate(length(max = 500))]
    description: String,
    #[validate(length(min = 1, max = 255))]
    main_image: String,
    #[validate(length(min = 1, max = 50))]
    color: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    sizes: Vec<StockPayload>,
}

#[derive(Deserialize, Validate, Debug)]
struct PatchProduct {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    category_id: Option<i32>,
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
    price: Option<Decimal>,
    #[validate(length(max = 500))]
    description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    main_image: Option<String>,
    #[validate(length(min = 1, max = 50))]
    color: Option<String>,
}

#[derive(Deserialize, Validate, Debug)]
struct StockPayload {
    size_id: i32,
    #[validate(range(min = 0))]
    stock: i32,
}

#[derive(Deserialize, Validate, Debug)]
struct StockLevel {
    #[validate(range(min = 0))]
    stock: i32,
}

#[derive(Deserialize, Validate, Debug)]
struct ImagePayload {
    #[validate(length(min = 1, max = 255))]
    product_image: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    #[test]
    fn accepts_prices_that_fit_the_column() {
        for raw in ["0", "49.99", "49.90", "99999999.99", "-0"] {
            assert!(check_price(price(raw)).is_ok(), "{raw}");
        }
    }

    #[test]
    fn rejects_prices_that_do_not_fit() {
        for raw in ["-0.01", "1.001", "100000000", "123456789.5"] {
            assert!(
                matches!(check_price(price(raw)), Err(ApiError::ValidationFail(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn stock_must_not_be_negative() {
        assert!(StockLevel { stock: 0 }.validate().is_ok());
        assert!(StockLevel { stock: -1 }.validate().is_err());

        assert_eq!(stock_level(7).unwrap(), 7u32);
        assert!(matches!(stock_level(-1), Err(ApiError::ValidationFail(_))));
    }
}
