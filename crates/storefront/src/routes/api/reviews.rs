//! Review API.
//!
//! `POST` validates and creates; `GET` lists a product's reviews. Unexpected
//! failures answer 500 with the underlying error in `detail`.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fashionable_queen_core::ProductId;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::services::reviews::{self, ReviewError, ReviewSubmission};
use crate::state::AppState;

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into() })),
    )
        .into_response()
}

fn internal_error(detail: &impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error", "detail": detail.to_string() })),
    )
        .into_response()
}

/// Query parameters for listing reviews.
#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub product: Option<String>,
}

/// List reviews for a product, newest first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>, Query(query): Query<ReviewsQuery>) -> Response {
    let Some(product) = query.product.filter(|p| !p.trim().is_empty()) else {
        return bad_request("Missing product ID");
    };

    match state.sanity().reviews_for(&ProductId::new(product)).await {
        Ok(reviews) => Json(json!({ "reviews": reviews })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch reviews");
            internal_error(&e)
        }
    }
}

/// Create a review.
///
/// Answers 201 `{message, review}` on success, 400 `{error}` for invalid
/// input or an unknown product.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    let submission = match ReviewSubmission::from_json(&body) {
        Ok(submission) => submission,
        Err(e) => return bad_request(e.to_string()),
    };

    add_breadcrumb(
        "review",
        "Submitting review",
        Some(&[("product_id", submission.product.as_str())]),
    );

    match reviews::submit_review(state.sanity(), submission).await {
        Ok(review) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Review added", "review": review })),
        )
            .into_response(),
        Err(ReviewError::Invalid(e)) => bad_request(e.to_string()),
        Err(ReviewError::UnknownProduct) => bad_request("Product not found"),
        Err(ReviewError::Sanity(e)) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to create review");
            internal_error(&e)
        }
    }
}
