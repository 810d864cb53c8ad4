//! Admin product creation page.
//!
//! The form posts as multipart to `POST /api/products`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use fashionable_queen_core::Category;

use crate::filters;
use crate::state::AppState;

/// Category option in the form's select.
#[derive(Clone)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Admin product form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/new_product.html")]
pub struct NewProductTemplate {
    pub categories: Vec<CategoryOption>,
    /// Without a write token the form is shown disabled.
    pub can_write: bool,
}

/// Display the product creation form.
pub async fn new_product(State(state): State<AppState>) -> impl IntoResponse {
    NewProductTemplate {
        categories: Category::ALL
            .iter()
            .map(|c| CategoryOption {
                value: c.as_str(),
                label: c.title(),
            })
            .collect(),
        can_write: state.sanity().can_write(),
    }
}
