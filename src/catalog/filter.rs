use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, Query, SelectStatement, SimpleExpr},
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::entities::{product, product_size, size};

/// Raw catalog query string. Everything stays a string here so malformed
/// numbers can be reported as our own validation error.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub show_search: Option<String>,
    pub reset_search: Option<String>,
    pub show_filters: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("{param} must be a number, got {value:?}")]
    InvalidPrice { param: &'static str, value: String },
}

/// The product predicates a catalog request asks for. `None` means the
/// parameter was absent or empty and restricts nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// Effective parameter values echoed back to the templates, so the filter
/// form and search box can be re-filled. Field order is the render order.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct FilterParams {
    pub color: String,
    pub size: String,
    pub min_price: String,
    pub max_price: String,
    pub q: String,
}

/// Presentation flags carried on the catalog query. They pick a fragment
/// and never narrow the product list.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiIntent {
    pub show_search: bool,
    pub reset_search: bool,
    pub show_filters: bool,
}

impl CatalogQuery {
    pub fn filter(&self) -> Result<ProductFilter, FilterError> {
        Ok(ProductFilter {
            search: non_empty(&self.q),
            color: non_empty(&self.color),
            size: non_empty(&self.size),
            min_price: parse_price("min_price", &self.min_price)?,
            max_price: parse_price("max_price", &self.max_price)?,
        })
    }

    pub fn params(&self) -> FilterParams {
        let echo = |value: &Option<String>| value.clone().unwrap_or_default();

        FilterParams {
            color: echo(&self.color),
            size: echo(&self.size),
            min_price: echo(&self.min_price),
            max_price: echo(&self.max_price),
            q: echo(&self.q),
        }
    }

    pub fn intent(&self) -> UiIntent {
        let flag = |value: &Option<String>| value.as_deref() == Some("true");

        UiIntent {
            show_search: flag(&self.show_search),
            reset_search: flag(&self.reset_search),
            show_filters: flag(&self.show_filters),
        }
    }
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        *self == ProductFilter::default()
    }

    /// Narrows `select` by every predicate that is set. Text search goes
    /// first, the rest follow in query-string table order.
    ///
    /// Both sides of a case-insensitive comparison are lowercased by the
    /// database, so they agree even where its `LOWER` only folds ASCII.
    pub fn apply(&self, mut select: Select<product::Entity>) -> Select<product::Entity> {
        if let Some(search) = &self.search {
            let pattern = contains_pattern(search);
            select = select.filter(
                Condition::any()
                    .add(lowered_like(product::Column::Name, &pattern))
                    .add(lowered_like(product::Column::Description, &pattern)),
            );
        }

        if let Some(color) = &self.color {
            select = select.filter(
                lowered(product::Column::Color).eq(Func::lower(Expr::val(color.as_str()))),
            );
        }

        if let Some(size) = &self.size {
            select = select.filter(product::Column::Id.in_subquery(products_in_size(size)));
        }

        if let Some(min) = self.min_price {
            select = select.filter(product::Column::Price.gte(min));
        }

        if let Some(max) = self.max_price {
            select = select.filter(product::Column::Price.lte(max));
        }

        select
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned)
}

fn parse_price(param: &'static str, value: &Option<String>) -> Result<Option<Decimal>, FilterError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => Decimal::from_str(&raw)
            .map(Some)
            .map_err(|_| FilterError::InvalidPrice { param, value: raw }),
    }
}

fn lowered(column: product::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col((product::Entity, column))))
}

/// `LOWER(column) LIKE LOWER(pattern)`, escaped with a backslash.
fn lowered_like(column: product::Column, pattern: &str) -> SimpleExpr {
    Expr::cust_with_exprs(
        r"$1 LIKE LOWER($2) ESCAPE '\'",
        [
            SimpleExpr::from(Func::lower(Expr::col((product::Entity, column)))),
            SimpleExpr::Value(pattern.into()),
        ],
    )
}

/// `LIKE` pattern matching `needle` anywhere, with the wildcard characters
/// of the input escaped with a backslash.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');

    escaped
}

/// Ids of products holding a stock row for the size called `name`.
fn products_in_size(name: &str) -> SelectStatement {
    Query::select()
        .column((product_size::Entity, product_size::Column::ProductId))
        .from(product_size::Entity)
        .inner_join(
            size::Entity,
            Expr::col((size::Entity, size::Column::Id))
                .equals((product_size::Entity, product_size::Column::SizeId)),
        )
        .and_where(
            Expr::expr(Func::lower(Expr::col((size::Entity, size::Column::Name))))
                .eq(Func::lower(Expr::val(name))),
        )
        .to_owned()
}

/// Every product, in model order. The base the catalog view narrows.
pub fn all_products() -> Select<product::Entity> {
    product::Entity::find().order_by_asc(product::Column::Name)
}
