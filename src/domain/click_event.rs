//! Click event model for asynchronous click tracking.

use crate::domain::entities::{ClickAttributes, Link};

/// An in-memory click waiting to be persisted.
///
/// Carries the link already resolved by the redirect handler, so the worker never
/// re-resolves the alias, together with the attributes extracted from the request.
///
/// # Usage Flow
///
/// 1. Created in the redirect handler after a successful resolution
/// 2. Sent to the bounded channel (non-blocking, dropped when full)
/// 3. Persisted by [`crate::domain::click_worker::run_click_worker`]
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link: Link,
    pub attributes: ClickAttributes,
}

impl ClickEvent {
    pub fn new(link: Link, attributes: ClickAttributes) -> Self {
        Self { link, attributes }
    }
}
