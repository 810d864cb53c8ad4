//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use fashionable_queen_core::{Category, CurrencyCode};
use tracing::instrument;

use crate::filters;
use crate::routes::catalog::ProductCardView;
use crate::sanity::{CatalogSummary, SanityError};
use crate::state::AppState;

/// Products shown per collection on the home page.
const HOME_SECTION_SIZE: usize = 4;

/// One collection strip on the home page.
#[derive(Clone)]
pub struct CollectionSection {
    pub heading: String,
    pub path: String,
    pub products: Vec<ProductCardView>,
}

impl CollectionSection {
    fn new(
        category: Category,
        result: Result<Vec<CatalogSummary>, SanityError>,
        currency: CurrencyCode,
    ) -> Self {
        let products = match result {
            Ok(entries) => entries
                .iter()
                .take(HOME_SECTION_SIZE)
                .map(|e| ProductCardView::new(e, currency))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, %category, "Failed to load home section");
                Vec::new()
            }
        };

        Self {
            heading: category.title().to_string(),
            path: format!("/{category}"),
            products,
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub sections: Vec<CollectionSection>,
}

/// Display the home page with the newest entries of each collection.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let sanity = state.sanity();
    let currency = state.config().checkout.currency;
    let [stitch, unstitch, trouser] = Category::STOREFRONT;

    let (stitched, unstitched, trousers) = tokio::join!(
        sanity.list_category(stitch),
        sanity.list_category(unstitch),
        sanity.list_category(trouser),
    );

    HomeTemplate {
        sections: vec![
            CollectionSection::new(stitch, stitched, currency),
            CollectionSection::new(unstitch, unstitched, currency),
            CollectionSection::new(trouser, trousers, currency),
        ],
    }
}
