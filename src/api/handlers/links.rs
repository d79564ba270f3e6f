//! Handlers for link management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{
    CreateLinkRequest, LinkListResponse, LinkResponse, UpdateLinkRequest,
};
use crate::api::dto::query::ListLinksQuery;
use crate::api::middleware::auth::AuthenticatedOwner;
use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;

fn to_response(state: &AppState, link: Link) -> LinkResponse {
    let short_url = state.link_service.get_short_url(&state.base_url, &link.alias);
    LinkResponse::new(link, short_url)
}

/// Creates a short link owned by the caller.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/landing",
///   "alias": "promo-2024",   // optional, generated when absent
///   "tags": ["campaign"]     // optional
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for an invalid URL or alias.
/// Returns 409 Conflict if the alias is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(
            owner_id,
            &payload.original_url,
            payload.alias,
            payload.tags.unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, link))))
}

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?limit=10`
///
/// Without `limit` the full set is returned.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Query(query): Query<ListLinksQuery>,
) -> Result<Json<LinkListResponse>, AppError> {
    let limit = query
        .validated_limit()
        .map_err(|msg| AppError::bad_request(msg, json!({ "field": "limit" })))?;

    let items: Vec<LinkResponse> = state
        .link_service
        .list_links(Some(owner_id), limit)
        .await?
        .into_iter()
        .map(|link| to_response(&state, link))
        .collect();

    Ok(Json(LinkListResponse {
        total: items.len(),
        items,
    }))
}

/// Returns one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the link does not exist or belongs to someone else.
pub async fn get_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.find_owned(id, owner_id).await?;

    Ok(Json(to_response(&state, link)))
}

/// Partially updates one of the caller's links.
///
/// # Endpoint
///
/// `PATCH /api/links/{id}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed.
///
/// ```json
/// {
///   "original_url": "https://new-destination.com",
///   "alias": "new-alias",
///   "tags": ["a", "b"],
///   "is_active": false
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the link does not exist or belongs to someone else.
/// Returns 409 Conflict if another link already uses the new alias.
pub async fn update_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    state.link_service.find_owned(id, owner_id).await?;

    let link = state.link_service.update_link(id, payload.into()).await?;

    Ok(Json(to_response(&state, link)))
}

/// Deletes one of the caller's links and its click history.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the link does not exist or belongs to someone else.
pub async fn delete_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
) -> Result<StatusCode, AppError> {
    state.link_service.find_owned(id, owner_id).await?;

    state.link_service.delete_link(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
