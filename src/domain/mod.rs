//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces, click aggregation and the click
//! pipeline, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`analytics`] - Grouping of click events by date and attribute
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. Redirect handler resolves an alias to an active link
//! 2. [`click_event::ClickEvent`] is sent to async channel
//! 3. [`click_worker::run_click_worker`] persists it via
//!    [`crate::application::services::ClickService`]

pub mod analytics;
pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
