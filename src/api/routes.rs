//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`]. Every route acts on the token owner's data.

use crate::api::handlers::{
    attribute_counts_handler, create_link_handler, delete_link_handler, get_link_handler,
    link_clicks_handler, link_daily_clicks_handler, list_links_handler, owner_clicks_handler,
    update_link_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /links`                    - Create a link
/// - `GET    /links?limit=N`            - List own links, newest first
/// - `GET    /links/{id}`               - Get one link
/// - `PATCH  /links/{id}`               - Partially update a link
/// - `DELETE /links/{id}`               - Delete a link and its clicks
/// - `GET    /links/{id}/clicks`        - Click events of a link
/// - `GET    /links/{id}/clicks/daily`  - Per-day counts in a date range
/// - `GET    /clicks`                   - Click events across own links
/// - `GET    /analytics/{attribute}`    - Counts by device, browser or country
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{id}/clicks", get(link_clicks_handler))
        .route("/links/{id}/clicks/daily", get(link_daily_clicks_handler))
        .route("/clicks", get(owner_clicks_handler))
        .route("/analytics/{attribute}", get(attribute_counts_handler))
}
