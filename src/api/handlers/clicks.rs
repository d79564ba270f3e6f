//! Handlers for click history endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::analytics::{DailyClicksResponse, DateCountResponse};
use crate::api::dto::clicks::ClickListResponse;
use crate::api::dto::query::{ClickPageQuery, DateRangeQuery};
use crate::api::middleware::auth::AuthenticatedOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Click events of one of the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links/{id}/clicks?limit=100&offset=0`
///
/// # Errors
///
/// - 400 Bad Request for a limit outside `1..=1000`
/// - 404 Not Found if the link does not exist or belongs to someone else
pub async fn link_clicks_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Query(page): Query<ClickPageQuery>,
) -> Result<Json<ClickListResponse>, AppError> {
    let (limit, offset) = page
        .validated_page()
        .map_err(|msg| AppError::bad_request(msg, json!({ "field": "limit" })))?;

    let link = state.link_service.find_owned(id, owner_id).await?;

    let clicks = state
        .click_service
        .list_for_link(link.id, Some(limit), offset)
        .await?;

    Ok(Json(clicks.into()))
}

/// Per-day click counts of one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}/clicks/daily?start=2024-01-01&end=2024-01-31`
///
/// Both dates are UTC calendar days and are included. Days without clicks are
/// omitted; the result is sorted by date.
pub async fn link_daily_clicks_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<DailyClicksResponse>, AppError> {
    let link = state.link_service.find_owned(id, owner_id).await?;

    let items = state
        .click_service
        .count_by_date_range(link.id, range.start, range.end)
        .await?
        .into_iter()
        .map(DateCountResponse::from)
        .collect();

    Ok(Json(DailyClicksResponse {
        link_id: link.id,
        start: range.start,
        end: range.end,
        items,
    }))
}

/// Click events across all of the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/clicks?limit=100&offset=0`
pub async fn owner_clicks_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Query(page): Query<ClickPageQuery>,
) -> Result<Json<ClickListResponse>, AppError> {
    let (limit, offset) = page
        .validated_page()
        .map_err(|msg| AppError::bad_request(msg, json!({ "field": "limit" })))?;

    let clicks = state
        .click_service
        .list_for_owner(owner_id, Some(limit), offset)
        .await?;

    Ok(Json(clicks.into()))
}
