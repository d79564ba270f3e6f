//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers, the click worker and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Alias registry and resolver
//! - [`services::click_service::ClickService`] - Click recording and aggregation
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
