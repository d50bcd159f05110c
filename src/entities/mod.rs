pub mod category;
pub mod product;
pub mod product_image;
pub mod product_size;
pub mod size;

use sea_orm::{
    sea_query::Index, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::debug;

use crate::entities::{
    category::Entity as Category,
    product::Entity as Product,
    product_image::Entity as ProductImage,
    product_size::Entity as ProductSize,
    size::Entity as Size,
};

/// Creates every catalog table that does not exist yet, referenced tables first.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, Category).await?;
    create_table(db, Size).await?;
    create_table(db, Product).await?;
    create_table(db, ProductImage).await?;
    create_table(db, ProductSize).await?;
    create_stock_index(db).await?;

    Ok(())
}

/// A product holds at most one stock row per size.
async fn create_stock_index(db: &DatabaseConnection) -> Result<(), DbErr> {
    let statement = Index::create()
        .name("idx_product_size_product_id_size_id")
        .table(ProductSize)
        .col(product_size::Column::ProductId)
        .col(product_size::Column::SizeId)
        .unique()
        .if_not_exists()
        .to_owned();

    db.execute(db.get_database_backend().build(&statement)).await?;
    debug!(index = "idx_product_size_product_id_size_id", "Ensured index exists");

    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let table = entity.table_name().to_owned();
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    debug!(table = %table, "Ensured table exists");

    Ok(())
}
