//! Catalog route handlers: category listings, detail pages, review form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use chrono::{DateTime, Utc};
use fashionable_queen_core::{Category, CurrencyCode, Price};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::Notice;
use crate::sanity::{CatalogEntry, CatalogSummary, RELATED_LIMIT, Review, SanityError};
use crate::services::reviews::{self, ReviewError, ReviewSubmission};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Product card shown in listings and related rails.
#[derive(Clone)]
pub struct ProductCardView {
    pub path: String,
    pub title: String,
    pub price: String,
    /// List price, shown struck through when a discount applies.
    pub original_price: Option<String>,
    pub image_url: Option<String>,
}

impl ProductCardView {
    #[must_use]
    pub fn new(summary: &CatalogSummary, currency: CurrencyCode) -> Self {
        Self {
            path: summary.path(),
            title: summary.title.clone(),
            price: Price::new(summary.effective_price(), currency).display(),
            original_price: summary
                .is_discounted()
                .then(|| Price::new(summary.price, currency).display()),
            image_url: summary.image_url.clone(),
        }
    }
}

/// A review as shown under a product.
#[derive(Clone)]
pub struct ReviewView {
    pub stars: String,
    pub rating: u8,
    pub text: String,
    pub author: String,
    pub date: Option<String>,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            stars: review.rating.stars(),
            rating: review.rating.get(),
            text: review.text.clone(),
            author: review.author.clone(),
            date: review.created_at.as_ref().map(format_date),
        }
    }
}

fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

/// Full product data for the detail page.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub category: String,
    pub path: String,
    pub title: String,
    pub price: String,
    pub original_price: Option<String>,
    pub fabric: Option<String>,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub pieces_included: Vec<String>,
    pub image_url: Option<String>,
    pub gallery: Vec<String>,
    pub size_chart_url: Option<String>,
    pub requires_size: bool,
    pub featured: bool,
}

impl ProductDetailView {
    fn new(entry: &CatalogEntry, currency: CurrencyCode) -> Self {
        Self {
            id: entry.id.to_string(),
            category: entry.category.as_str().to_string(),
            path: entry.category.detail_path(entry.id.as_str()),
            title: entry.title.clone(),
            price: Price::new(entry.effective_price(), currency).display(),
            original_price: entry
                .is_discounted()
                .then(|| Price::new(entry.price, currency).display()),
            fabric: entry.fabric.clone(),
            description: entry.description.clone(),
            sizes: entry.size_options.clone(),
            colors: entry.colors(),
            pieces_included: entry.pieces_included.clone(),
            image_url: entry.image_url.clone(),
            gallery: entry.gallery.clone(),
            size_chart_url: entry.size_chart_url.clone(),
            requires_size: entry.category.requires_size(),
            featured: entry.is_featured.unwrap_or(false),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogIndexTemplate {
    pub heading: String,
    pub products: Vec<ProductCardView>,
    pub load_failed: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/show.html")]
pub struct CatalogShowTemplate {
    pub product: ProductDetailView,
    pub reviews: Vec<ReviewView>,
    pub related: Vec<ProductCardView>,
    pub notice: Option<Notice>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Parse a category path segment, treating unknown values as a missing page.
pub(crate) fn parse_category(segment: &str) -> Result<Category> {
    segment
        .parse::<Category>()
        .map_err(|_| AppError::NotFound("Page not found".to_string()))
}

/// Display one category's listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse> {
    let category = parse_category(&category)?;
    let currency = state.config().checkout.currency;

    let (products, load_failed) = match state.sanity().list_category(category).await {
        Ok(entries) => (
            entries
                .iter()
                .map(|e| ProductCardView::new(e, currency))
                .collect(),
            false,
        ),
        Err(e) => {
            tracing::error!(error = %e, %category, "Failed to load category listing");
            (Vec::new(), true)
        }
    };

    Ok(CatalogIndexTemplate {
        heading: category.title().to_string(),
        products,
        load_failed,
    })
}

/// Display a product detail page.
///
/// Reviews and related products are loaded concurrently; either failing
/// leaves its section empty.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path((category, id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let category = parse_category(&category)?;
    let sanity = state.sanity();
    let currency = state.config().checkout.currency;

    let entry = match sanity.get_entry(category, &id).await {
        Ok(entry) => entry,
        Err(SanityError::NotFound(_)) => {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let related_fut = async {
        match entry.fabric.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(fabric) => sanity.related_by_fabric(&entry.id, fabric, RELATED_LIMIT).await,
            None => Ok(Vec::new()),
        }
    };
    let (reviews, related) = tokio::join!(sanity.reviews_for(&entry.id), related_fut);

    let reviews = reviews
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load reviews"))
        .unwrap_or_default();
    let related = related
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load related products"))
        .unwrap_or_default();

    Ok(CatalogShowTemplate {
        product: ProductDetailView::new(&entry, currency),
        reviews: reviews.iter().map(ReviewView::from).collect(),
        related: related
            .iter()
            .map(|r| ProductCardView::new(r, currency))
            .collect(),
        notice: Notice::take(&session).await,
    })
}

/// Review form data from the detail page.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: String,
    pub review: String,
    pub author: String,
}

/// Submit a review from the detail page form, then return to the page.
#[instrument(skip(state, session, form))]
pub async fn submit_review(
    State(state): State<AppState>,
    session: Session,
    Path((category, id)): Path<(String, String)>,
    Form(form): Form<ReviewForm>,
) -> Result<Redirect> {
    let category = parse_category(&category)?;
    let back = category.detail_path(&id);

    // A non-numeric rating fails the same range check as an out-of-range one.
    let rating = form.rating.trim().parse::<i64>().unwrap_or(0);

    let notice = match ReviewSubmission::from_fields(&id, rating, &form.review, &form.author) {
        Err(e) => Notice::error(e.to_string()),
        Ok(submission) => match reviews::submit_review(state.sanity(), submission).await {
            Ok(_) => Notice::info("Thank you for your review!"),
            Err(ReviewError::Invalid(e)) => Notice::error(e.to_string()),
            Err(ReviewError::UnknownProduct) => Notice::error("Product not found"),
            Err(ReviewError::Sanity(e)) => {
                tracing::error!(error = %e, "Failed to save review");
                Notice::error("Error submitting review. Please try again.")
            }
        },
    };

    notice.flash(&session).await;
    Ok(Redirect::to(&back))
}
