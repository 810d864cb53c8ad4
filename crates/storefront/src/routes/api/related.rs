//! Related products by fabric.

use axum::{
    Json,
    extract::{Query, State},
};
use fashionable_queen_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{ApiError, AppError};
use crate::sanity::{CatalogSummary, RELATED_LIMIT};
use crate::state::AppState;

/// Query parameters for related products.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedQuery {
    pub product_id: Option<String>,
    pub fabric: Option<String>,
}

/// Up to six entries of any category sharing the product's fabric.
#[instrument(skip(state))]
pub async fn related_products(
    State(state): State<AppState>,
    Query(query): Query<RelatedQuery>,
) -> Result<Json<Vec<CatalogSummary>>, ApiError> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(product_id), Some(fabric)) = (non_blank(query.product_id), non_blank(query.fabric))
    else {
        return Err(AppError::BadRequest("Missing productId or fabric".to_string()).into());
    };

    let entries = state
        .sanity()
        .related_by_fabric(&ProductId::new(product_id), &fabric, RELATED_LIMIT)
        .await?;
    Ok(Json(entries))
}
