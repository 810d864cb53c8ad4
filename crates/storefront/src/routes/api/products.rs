//! Admin product creation API.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::instrument;

use crate::services::products::{self, CreateProductError, NewProductRequest, ProductForm};
use crate::state::AppState;

fn failure(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// Create a catalog entry from the multipart admin form.
///
/// Answers 200 `{success: true, data}`, 400 for invalid input and 502 when
/// an upload or the create mutation fails.
#[instrument(skip(state, multipart))]
pub async fn create(State(state): State<AppState>, multipart: Multipart) -> Response {
    let request = match ProductForm::read(multipart)
        .await
        .and_then(NewProductRequest::from_form)
    {
        Ok(request) => request,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match products::create_product(state.sanity(), request).await {
        Ok(document) => Json(json!({ "success": true, "data": document })).into_response(),
        Err(CreateProductError::Invalid(e)) => failure(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Product creation failed");
            failure(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}
