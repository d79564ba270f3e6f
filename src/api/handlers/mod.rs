//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod analytics;
pub mod clicks;
pub mod health;
pub mod links;
pub mod redirect;

pub use analytics::attribute_counts_handler;
pub use clicks::{link_clicks_handler, link_daily_clicks_handler, owner_clicks_handler};
pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    update_link_handler,
};
pub use redirect::redirect_handler;
