//! Handler for attribute breakdowns.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::api::dto::analytics::{AttributeCountResponse, AttributeCountsResponse};
use crate::api::middleware::auth::AuthenticatedOwner;
use crate::domain::analytics::ClickAttribute;
use crate::error::AppError;
use crate::state::AppState;

/// Click counts across the caller's links grouped by device, browser or country.
///
/// # Endpoint
///
/// `GET /api/analytics/{attribute}` where `attribute` is `device`, `browser`
/// or `country`.
///
/// # Response
///
/// ```json
/// {
///   "attribute": "browser",
///   "items": [
///     { "value": "Chrome", "count": 12 },
///     { "value": "Unknown", "count": 3 }
///   ]
/// }
/// ```
///
/// Clicks without a value are counted under `"Unknown"`.
///
/// # Errors
///
/// Returns 400 Bad Request for any other attribute name.
pub async fn attribute_counts_handler(
    Path(attribute): Path<String>,
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
) -> Result<Json<AttributeCountsResponse>, AppError> {
    let attribute: ClickAttribute = attribute.parse::<ClickAttribute>().map_err(|e| {
        AppError::bad_request(
            "Unsupported attribute",
            json!({ "reason": e.to_string(), "allowed": ["device", "browser", "country"] }),
        )
    })?;

    let items = state
        .click_service
        .count_by_attribute(owner_id, attribute)
        .await?
        .into_iter()
        .map(AttributeCountResponse::from)
        .collect();

    Ok(Json(AttributeCountsResponse {
        attribute: attribute.as_str(),
        items,
    }))
}
