//! Repository trait for click event storage.

use crate::domain::analytics::{AttributeCount, ClickAttribute, DateCount};
use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Append-only click log.
///
/// Click events are never updated. They disappear only when their link is
/// deleted. All listings are ordered newest first; `limit: None` returns every
/// event from `offset` on.
///
/// Aggregations are computed by the store so callers never load the full log.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - in-process store for tests
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_click.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click event; the timestamp is assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on database errors, including a dangling `link_id`.
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Click events of one link.
    async fn list_for_link(
        &self,
        link_id: i64,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Click>, AppError>;

    /// Click events across every link of one owner.
    async fn list_for_owner(
        &self,
        owner_id: i64,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Click>, AppError>;

    /// Per UTC day counts of one link's clicks with `from <= timestamp < until`.
    ///
    /// Sorted by date ascending; days without clicks are absent.
    async fn count_by_date_between(
        &self,
        link_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DateCount>, AppError>;

    /// Counts of an owner's clicks grouped by one attribute.
    ///
    /// Missing or empty values are grouped under
    /// [`crate::domain::analytics::UNKNOWN_LABEL`]. Sorted by count descending,
    /// then by value.
    async fn count_by_attribute(
        &self,
        owner_id: i64,
        attribute: ClickAttribute,
    ) -> Result<Vec<AttributeCount>, AppError>;
}
