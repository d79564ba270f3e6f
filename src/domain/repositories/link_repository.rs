//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Alias uniqueness is enforced by the store itself: `create` and `update` must
/// report a concurrent or pre-existing holder of the same alias as
/// [`AppError::AliasConflict`], independently of any read-before-write check
/// done by callers. Returned links carry the derived `clicks` count.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - in-process store for tests
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new active link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AliasConflict`] if the alias is already taken.
    /// Returns [`AppError::Store`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its id, regardless of its active flag.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Finds a link by exact (case-sensitive) alias, regardless of its active flag.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError>;

    /// Finds an active link by exact alias. Inactive links are not returned.
    async fn find_active_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError>;

    /// Lists links newest first.
    ///
    /// # Arguments
    ///
    /// - `owner_id` - Restrict to one owner; `None` lists across all owners
    /// - `limit` - Maximum number of links; `None` returns the full set
    async fn list(&self, owner_id: Option<i64>, limit: Option<i64>)
    -> Result<Vec<Link>, AppError>;

    /// Partially updates a link and refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    /// Returns [`AppError::AliasConflict`] if the new alias is taken.
    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError>;

    /// Removes a link and its click events.
    ///
    /// Returns `Ok(true)` if a link was deleted, `Ok(false)` if none had this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
