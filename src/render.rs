//! Page shell vs. fragment selection and template rendering.
//!
//! Requests sent by the in-page update client carry an `HX-Request` header;
//! those get only the fragment they asked for. Everything else gets the full
//! page shell with the view's content template included.

use axum::{http::HeaderMap, response::Html};
use minijinja::Environment;
use serde::Serialize;

use crate::catalog::UiIntent;
use crate::middleware::logging::ApiError;

pub const HX_REQUEST: &str = "hx-request";

/// Every template the storefront renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Base,
    HomeContent,
    Catalog,
    FilterModal,
    SearchInput,
    SearchButton,
    ProductDetail,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Base,
        Page::HomeContent,
        Page::Catalog,
        Page::FilterModal,
        Page::SearchInput,
        Page::SearchButton,
        Page::ProductDetail,
    ];

    pub fn template_name(self) -> &'static str {
        match self {
            Page::Base => "base.html",
            Page::HomeContent => "home_content.html",
            Page::Catalog => "catalog.html",
            Page::FilterModal => "filter_modal.html",
            Page::SearchInput => "search_input.html",
            Page::SearchButton => "search_button.html",
            Page::ProductDetail => "product_detail.html",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Page::Base => include_str!("../templates/base.html"),
            Page::HomeContent => include_str!("../templates/home_content.html"),
            Page::Catalog => include_str!("../templates/catalog.html"),
            Page::FilterModal => include_str!("../templates/filter_modal.html"),
            Page::SearchInput => include_str!("../templates/search_input.html"),
            Page::SearchButton => include_str!("../templates/search_button.html"),
            Page::ProductDetail => include_str!("../templates/product_detail.html"),
        }
    }
}

/// True when the request came from the in-page update client.
pub fn is_partial(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .is_some_and(|value| !value.as_bytes().is_empty())
}

/// Fragment for a partial catalog request. The search flags win over the
/// filter panel; `show_search` wins over `reset_search`.
pub fn catalog_fragment(intent: UiIntent) -> Page {
    if intent.show_search {
        Page::SearchInput
    } else if intent.reset_search {
        Page::SearchButton
    } else if intent.show_filters {
        Page::FilterModal
    } else {
        Page::Catalog
    }
}

#[derive(Serialize)]
struct Shell<'a, T: Serialize> {
    content_template: &'static str,
    #[serde(flatten)]
    context: &'a T,
}

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Templates, minijinja::Error> {
        let mut env = Environment::new();
        for page in Page::ALL {
            env.add_template(page.template_name(), page.source())?;
        }

        Ok(Templates { env })
    }

    pub fn render<T: Serialize>(&self, page: Page, context: &T) -> Result<Html<String>, ApiError> {
        let template = self.env.get_template(page.template_name())?;
        Ok(Html(template.render(context)?))
    }

    /// Renders `content` on its own for partial requests, inside the page
    /// shell otherwise.
    pub fn render_page<T: Serialize>(
        &self,
        partial: bool,
        content: Page,
        context: &T,
    ) -> Result<Html<String>, ApiError> {
        if partial {
            return self.render(content, context);
        }

        self.render(
            Page::Base,
            &Shell {
                content_template: content.template_name(),
                context,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn partial_needs_a_non_empty_header() {
        let mut headers = HeaderMap::new();
        assert!(!is_partial(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static(""));
        assert!(!is_partial(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        assert!(is_partial(&headers));
    }

    #[test]
    fn catalog_fragment_precedence() {
        let intent = |show_search, reset_search, show_filters| UiIntent {
            show_search,
            reset_search,
            show_filters,
        };

        assert_eq!(catalog_fragment(intent(false, false, false)), Page::Catalog);
        assert_eq!(catalog_fragment(intent(false, false, true)), Page::FilterModal);
        assert_eq!(catalog_fragment(intent(false, true, true)), Page::SearchButton);
        assert_eq!(catalog_fragment(intent(true, true, true)), Page::SearchInput);
    }

    #[test]
    fn every_template_compiles() {
        let templates = Templates::new().unwrap();
        for page in Page::ALL {
            assert!(templates.env.get_template(page.template_name()).is_ok());
        }
    }

    #[test]
    fn full_pages_wrap_the_fragment_in_the_shell() {
        let templates = Templates::new().unwrap();
        let context = json!({
            "categories": [{"id": 1, "name": "Shoes", "slug": "shoes"}],
            "current_category": null,
        });

        let full = templates
            .render_page(false, Page::HomeContent, &context)
            .unwrap()
            .0;
        let partial = templates
            .render_page(true, Page::HomeContent, &context)
            .unwrap()
            .0;

        assert!(full.contains("<html"));
        assert!(full.contains(r#"id="home-content""#));
        assert!(!partial.contains("<html"));
        assert!(partial.contains(r#"id="home-content""#));
    }

    #[test]
    fn output_is_escaped() {
        let templates = Templates::new().unwrap();
        let context = json!({
            "search_query": "<script>",
            "filter_params": {"q": "<script>"},
        });

        let html = templates.render(Page::SearchInput, &context).unwrap().0;
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
