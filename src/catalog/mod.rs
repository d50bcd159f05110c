//! Catalog reads shared by the storefront pages: the filtered product listing,
//! product detail with related products, and the lookup lists the templates
//! need for navigation.

pub mod filter;
pub mod slug;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use thiserror::Error;

use crate::entities::{
    category, product, product_image,
    product_size::{self, SizeStock},
    size,
};
pub use filter::{CatalogQuery, FilterError, FilterParams, ProductFilter, UiIntent};

/// How many products of the same category the detail page suggests.
pub const RELATED_PRODUCTS_LIMIT: u64 = 4;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No category with slug {0:?} was found.")]
    CategoryNotFound(String),
    #[error("No product with slug {0:?} was found.")]
    ProductNotFound(String),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// Result of resolving a catalog request.
#[derive(Debug)]
pub struct CatalogListing {
    pub products: Vec<product::Model>,
    pub category: Option<category::Model>,
    pub params: FilterParams,
    pub intent: UiIntent,
}

#[derive(Debug)]
pub struct ProductDetail {
    pub product: product::Model,
    pub category: category::Model,
    pub images: Vec<product_image::Model>,
    pub sizes: Vec<SizeStock>,
    pub related: Vec<product::Model>,
}

/// Resolves a catalog listing: the category scope from the path first, then
/// the query-string filters, all combined with AND.
///
/// An empty or missing `category_slug` means every category. An unknown slug
/// is an error rather than an empty list.
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    category_slug: Option<&str>,
    query: &CatalogQuery,
) -> Result<CatalogListing, CatalogError> {
    let mut select = filter::all_products();

    let category = match category_slug.filter(|slug| !slug.is_empty()) {
        Some(slug) => {
            let category = find_category(db, slug).await?;
            select = select.filter(product::Column::CategoryId.eq(category.id));
            Some(category)
        }
        None => None,
    };

    let products = query.filter()?.apply(select).all(db).await?;

    Ok(CatalogListing {
        products,
        category,
        params: query.params(),
        intent: query.intent(),
    })
}

pub async fn find_category<C: ConnectionTrait>(
    db: &C,
    slug: &str,
) -> Result<category::Model, CatalogError> {
    category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| CatalogError::CategoryNotFound(slug.to_owned()))
}

pub async fn categories<C: ConnectionTrait>(db: &C) -> Result<Vec<category::Model>, DbErr> {
    category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
}

pub async fn sizes<C: ConnectionTrait>(db: &C) -> Result<Vec<size::Model>, DbErr> {
    size::Entity::find().order_by_asc(size::Column::Id).all(db).await
}

pub async fn product_detail<C: ConnectionTrait>(
    db: &C,
    slug: &str,
) -> Result<ProductDetail, CatalogError> {
    let product = product::Entity::find()
        .filter(product::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| CatalogError::ProductNotFound(slug.to_owned()))?;

    let category = category::Entity::find_by_id(product.category_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("category {} of product {}", product.category_id, product.id))
        })?;

    let images = product_images(db, product.id).await?;
    let sizes = size_stock(db, &product).await?;
    let related = related_products(db, &product).await?;

    Ok(ProductDetail {
        product,
        category,
        images,
        sizes,
        related,
    })
}

/// Up to [`RELATED_PRODUCTS_LIMIT`] other products from the same category, by name.
pub async fn related_products<C: ConnectionTrait>(
    db: &C,
    product: &product::Model,
) -> Result<Vec<product::Model>, DbErr> {
    product::Entity::find()
        .filter(product::Column::CategoryId.eq(product.category_id))
        .filter(product::Column::Id.ne(product.id))
        .order_by_asc(product::Column::Name)
        .limit(RELATED_PRODUCTS_LIMIT)
        .all(db)
        .await
}

pub async fn product_images<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
) -> Result<Vec<product_image::Model>, DbErr> {
    product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .order_by_asc(product_image::Column::Id)
        .all(db)
        .await
}

/// Stock rows of `product`, labelled with their size names.
pub async fn size_stock<C: ConnectionTrait>(
    db: &C,
    product: &product::Model,
) -> Result<Vec<SizeStock>, DbErr> {
    let rows = product_size::Entity::find()
        .filter(product_size::Column::ProductId.eq(product.id))
        .find_also_related(size::Entity)
        .order_by_asc(product_size::Column::SizeId)
        .all(db)
        .await?;

    Ok(rows
        .iter()
        .filter_map(|(row, size)| {
            size.as_ref()
                .map(|size| SizeStock::new(row, &size.name, &product.name))
        })
        .collect())
}
