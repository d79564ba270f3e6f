//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use std::net::SocketAddr;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_info::extract_click_attributes;

/// Redirects an alias to its original URL.
///
/// # Endpoint
///
/// `GET /{alias}`
///
/// # Request Flow
///
/// 1. Resolve the alias to an active link
/// 2. Extract click attributes from the request
/// 3. Send click event to background worker
/// 4. Return 307 Temporary Redirect
///
/// # Click Tracking
///
/// Click events are sent to a bounded channel for async processing.
/// If the queue is full, the click is dropped with a warning (fire-and-forget).
///
/// # Errors
///
/// Returns 404 Not Found if the alias is unknown or its link is inactive.
pub async fn redirect_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.resolve(&alias).await?;

    let target = link.original_url.clone();
    let attributes = extract_click_attributes(&headers, addr.ip());

    match state.click_sender.try_send(ClickEvent::new(link, attributes)) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            tracing::warn!(alias = %event.link.alias, "Click queue full, dropping click");
        }
        Err(TrySendError::Closed(event)) => {
            tracing::warn!(alias = %event.link.alias, "Click queue closed, dropping click");
        }
    }

    Ok(Redirect::temporary(&target))
}
