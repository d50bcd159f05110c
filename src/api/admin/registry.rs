//! Static description of the models the management API exposes: list
//! columns, list filters, where slugs come from and which rows are edited
//! inline with their parent.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize, Debug, PartialEq)]
pub struct AdminModel {
    pub name: &'static str,
    pub plural: &'static str,
    pub endpoint: &'static str,
    pub ordering: &'static [&'static str],
    pub list_display: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    /// Field the slug is derived from when none is supplied.
    pub prepopulated_slug: Option<&'static str>,
    pub inlines: &'static [AdminInline],
}

#[derive(Serialize, Debug, PartialEq)]
pub struct AdminInline {
    pub name: &'static str,
    pub endpoint: &'static str,
}

pub const ADMIN_MODELS: &[AdminModel] = &[
    AdminModel {
        name: "Category",
        plural: "Categories",
        endpoint: "/admin/api/categories",
        ordering: &["name"],
        list_display: &["name"],
        list_filter: &[],
        prepopulated_slug: Some("name"),
        inlines: &[],
    },
    AdminModel {
        name: "Product",
        plural: "Products",
        endpoint: "/admin/api/products",
        ordering: &["name"],
        list_display: &["name", "category", "price"],
        list_filter: &["name", "color"],
        prepopulated_slug: Some("name"),
        inlines: &[
            AdminInline {
                name: "ProductImage",
                endpoint: "/admin/api/products/{id}/images",
            },
            AdminInline {
                name: "ProductSize",
                endpoint: "/admin/api/products/{id}/sizes/{size_id}",
            },
        ],
    },
    AdminModel {
        name: "Size",
        plural: "Sizes",
        endpoint: "/admin/api/sizes",
        ordering: &["id"],
        list_display: &["name"],
        list_filter: &[],
        prepopulated_slug: None,
        inlines: &[],
    },
];

pub fn registry_router() -> Router {
    Router::new().route("/models", get(list_models))
}

async fn list_models() -> Json<&'static [AdminModel]> {
    Json(ADMIN_MODELS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_model(name: &str) -> Option<&'static AdminModel> {
        ADMIN_MODELS
            .iter()
            .find(|model| model.name.eq_ignore_ascii_case(name))
    }

    #[test]
    fn product_lists_name_category_and_price() {
        let product = find_model("product").unwrap();

        assert_eq!(product.list_display, ["name", "category", "price"]);
        assert_eq!(product.list_filter, ["name", "color"]);
        assert_eq!(product.prepopulated_slug, Some("name"));
        assert_eq!(product.inlines.len(), 2);
    }

    #[test]
    fn sizes_have_no_slug() {
        assert_eq!(find_model("Size").unwrap().prepopulated_slug, None);
        assert!(find_model("Order").is_none());
    }
}
