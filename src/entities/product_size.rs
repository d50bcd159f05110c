use sea_orm::entity::prelude::*;
use serde::Serialize;
use std::fmt;

use crate::entities::product::Entity as Product;
use crate::entities::size::Entity as Size;

/// Stock held for one product in one size.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "product_size")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub product_id: i32,
    pub size_id: i32,
    /// Unsigned, so a negative stock level cannot be stored.
    pub stock: u32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Product",
        from = "crate::entities::product_size::Column::ProductId",
        to = "crate::entities::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(
        belongs_to = "Size",
        from = "crate::entities::product_size::Column::SizeId",
        to = "crate::entities::size::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Size,
}

impl Related<crate::entities::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<crate::entities::size::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Size.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A stock row joined with the names it points at, used by the detail page
/// and the admin product view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SizeStock {
    pub size_id: i32,
    pub size: String,
    pub stock: u32,
    pub label: String,
}

impl SizeStock {
    pub fn new(row: &Model, size: &str, product: &str) -> SizeStock {
        let label = StockLabel {
            size,
            stock: row.stock,
            product,
        }
        .to_string();

        SizeStock {
            size_id: row.size_id,
            size: size.to_owned(),
            stock: row.stock,
            label,
        }
    }
}

struct StockLabel<'a> {
    size: &'a str,
    stock: u32,
    product: &'a str,
}

impl fmt::Display for StockLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} in stock) for {}", self.size, self.stock, self.product)
    }
}
