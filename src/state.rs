//! Shared application state injected into handlers.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{AuthService, ClickService, LinkService};
use crate::domain::click_event::ClickEvent;

/// State shared by all handlers and middleware.
///
/// Services hold their repositories behind trait objects, so the same state
/// type serves the PostgreSQL deployment and in-memory test setups.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub click_service: Arc<ClickService>,
    pub auth_service: Arc<AuthService>,
    /// Queue feeding the background click worker.
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Public origin used to render `short_url`.
    pub base_url: String,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        click_service: Arc<ClickService>,
        auth_service: Arc<AuthService>,
        click_sender: mpsc::Sender<ClickEvent>,
        base_url: String,
    ) -> Self {
        Self {
            link_service,
            click_service,
            auth_service,
            click_sender,
            base_url,
        }
    }
}
