//! Alias registry and resolver.

use std::sync::Arc;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::alias::{generate_alias, validate_custom_alias};
use crate::utils::url_validator::validate_url;
use serde_json::json;

/// Attempts at finding a free generated alias before giving up.
const MAX_ALIAS_ATTEMPTS: usize = 10;

/// Service owning alias allocation and alias-to-link resolution.
///
/// Alias uniqueness is ultimately decided by the store: the read-before-write
/// checks here only produce an early, friendlier [`AppError::AliasConflict`].
/// A concurrent writer that slips past them is still rejected by the
/// repository with the same error.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self { repository }
    }

    /// Creates an active link for `owner_id`.
    ///
    /// # Arguments
    ///
    /// - `original_url` - Destination, must be an absolute http(s) URL
    /// - `alias` - Custom alias; generated when `None`
    /// - `tags` - Free-form labels stored with the link
    ///
    /// # Alias Generation
    ///
    /// Generated aliases are 6 random base-36 characters. If the store reports
    /// the alias as taken, a new one is drawn, up to 10 times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidUrl`] if the URL is rejected.
    /// Returns [`AppError::Validation`] if the custom alias is malformed or reserved.
    /// Returns [`AppError::AliasConflict`] if the custom alias is taken.
    /// Returns [`AppError::Store`] on database errors or alias exhaustion.
    pub async fn create_link(
        &self,
        owner_id: i64,
        original_url: &str,
        alias: Option<String>,
        tags: Vec<String>,
    ) -> Result<Link, AppError> {
        let original_url = checked_url(original_url)?;

        let link = match alias {
            Some(alias) => {
                validate_custom_alias(&alias)?;

                if self.repository.find_by_alias(&alias).await?.is_some() {
                    return Err(AppError::alias_conflict(&alias));
                }

                self.repository
                    .create(NewLink {
                        original_url,
                        alias,
                        tags,
                        owner_id,
                    })
                    .await?
            }
            None => {
                self.create_with_generated_alias(owner_id, original_url, tags)
                    .await?
            }
        };

        tracing::info!(
            link_id = link.id,
            alias = %link.alias,
            owner_id,
            "Link created"
        );

        Ok(link)
    }

    async fn create_with_generated_alias(
        &self,
        owner_id: i64,
        original_url: String,
        tags: Vec<String>,
    ) -> Result<Link, AppError> {
        for attempt in 1..=MAX_ALIAS_ATTEMPTS {
            let new_link = NewLink {
                original_url: original_url.clone(),
                alias: generate_alias(),
                tags: tags.clone(),
                owner_id,
            };

            match self.repository.create(new_link).await {
                Err(AppError::AliasConflict { .. }) => {
                    tracing::debug!(attempt, "Generated alias already taken, retrying");
                }
                other => return other,
            }
        }

        Err(AppError::store(
            "Failed to generate unique alias",
            json!({ "attempts": MAX_ALIAS_ATTEMPTS }),
        ))
    }

    /// Resolves an alias to its active link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] both for unknown and for inactive aliases;
    /// the two cases produce the same error.
    pub async fn resolve(&self, alias: &str) -> Result<Link, AppError> {
        self.repository
            .find_active_by_alias(alias)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "alias": alias })))
    }

    /// Retrieves a link by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn find_by_id(&self, id: i64) -> Result<Link, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| link_not_found(id))
    }

    /// Retrieves a link by id if it belongs to `owner_id`.
    ///
    /// A link owned by someone else is reported exactly like a missing one.
    pub async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Link, AppError> {
        match self.repository.find_by_id(id).await? {
            Some(link) if link.is_owned_by(owner_id) => Ok(link),
            _ => Err(link_not_found(id)),
        }
    }

    /// Applies a partial update.
    ///
    /// Omitted fields stay unchanged; `updated_at` is always refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    /// Returns [`AppError::InvalidUrl`] or [`AppError::Validation`] for a bad
    /// new URL or alias.
    /// Returns [`AppError::AliasConflict`] if another link holds the new alias.
    pub async fn update_link(&self, id: i64, mut patch: LinkPatch) -> Result<Link, AppError> {
        let current = self.find_by_id(id).await?;

        if let Some(url) = patch.original_url.take() {
            patch.original_url = Some(checked_url(&url)?);
        }

        if patch.alias.as_deref() == Some(current.alias.as_str()) {
            patch.alias = None;
        }

        if let Some(alias) = patch.alias.as_deref() {
            validate_custom_alias(alias)?;

            if let Some(holder) = self.repository.find_by_alias(alias).await?
                && holder.id != id
            {
                return Err(AppError::alias_conflict(alias));
            }
        }

        let link = self.repository.update(id, patch).await?;

        tracing::info!(link_id = link.id, alias = %link.alias, "Link updated");

        Ok(link)
    }

    /// Deletes a link together with its click events.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn delete_link(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(link_not_found(id));
        }

        tracing::info!(link_id = id, "Link deleted");
        Ok(())
    }

    /// Lists links newest first.
    ///
    /// `owner_id = None` is the administrative view across all owners.
    /// `limit = None` returns the full set.
    pub async fn list_links(
        &self,
        owner_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Link>, AppError> {
        self.repository.list(owner_id, limit).await
    }

    /// Checks store connectivity.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Builds the public short URL for an alias.
    pub fn get_short_url(&self, base_url: &str, alias: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), alias)
    }
}

fn checked_url(input: &str) -> Result<String, AppError> {
    validate_url(input).map_err(|e| {
        AppError::invalid_url("Invalid URL", json!({ "reason": e.to_string() }))
    })
}

fn link_not_found(id: i64) -> AppError {
    AppError::not_found("Link not found", json!({ "id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn create_test_link(id: i64, alias: &str, url: &str, owner_id: i64) -> Link {
        let now = Utc::now();
        Link {
            id,
            original_url: url.to_string(),
            alias: alias.to_string(),
            is_active: true,
            tags: vec![],
            owner_id,
            clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn link_from(new_link: NewLink) -> Link {
        create_test_link(10, &new_link.alias, &new_link.original_url, new_link.owner_id)
    }

    #[tokio::test]
    async fn test_create_link_generates_alias() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_by_alias().times(0);
        mock_repo
            .expect_create()
            .withf(|new_link| {
                new_link.alias.len() == 6
                    && new_link.original_url == "https://example.com"
                    && new_link.owner_id == 1
            })
            .times(1)
            .returning(|new_link| Ok(link_from(new_link)));

        let service = LinkService::new(Arc::new(mock_repo));

        let link = service
            .create_link(1, "https://example.com", None, vec![])
            .await
            .unwrap();

        assert_eq!(link.alias.len(), 6);
        assert!(link.is_active);
    }

    #[tokio::test]
    async fn test_create_link_stores_trimmed_url() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_create()
            .withf(|new_link| new_link.original_url == "https://example.com/Path?q=1")
            .times(1)
            .returning(|new_link| Ok(link_from(new_link)));

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service
            .create_link(1, "  https://example.com/Path?q=1 ", None, vec![])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_link_retries_generated_alias_conflict() {
        let mut mock_repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();

        mock_repo
            .expect_create()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|new_link| Err(AppError::alias_conflict(&new_link.alias)));
        mock_repo
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_link| Ok(link_from(new_link)));

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service
            .create_link(1, "https://example.com", None, vec![])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_link_gives_up_after_max_attempts() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_create()
            .times(MAX_ALIAS_ATTEMPTS)
            .returning(|new_link| Err(AppError::alias_conflict(&new_link.alias)));

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service
            .create_link(1, "https://example.com", None, vec![])
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Store { .. }));
    }

    #[tokio::test]
    async fn test_create_link_invalid_url() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_create().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service.create_link(1, "not-a-url", None, vec![]).await;

        assert!(matches!(result.unwrap_err(), AppError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_create_link_with_custom_alias() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_alias()
            .withf(|alias| alias == "promo-2024")
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .withf(|new_link| new_link.alias == "promo-2024" && new_link.tags == ["sale"])
            .times(1)
            .returning(|new_link| Ok(link_from(new_link)));

        let service = LinkService::new(Arc::new(mock_repo));

        let link = service
            .create_link(
                1,
                "https://example.com",
                Some("promo-2024".to_string()),
                vec!["sale".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(link.alias, "promo-2024");
    }

    #[tokio::test]
    async fn test_create_link_custom_alias_conflict() {
        let mut mock_repo = MockLinkRepository::new();

        let existing = create_test_link(5, "taken", "https://other.com", 2);
        mock_repo
            .expect_find_by_alias()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo.expect_create().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service
            .create_link(1, "https://example.com", Some("taken".to_string()), vec![])
            .await;

        assert!(matches!(result.unwrap_err(), AppError::AliasConflict { .. }));
    }

    #[tokio::test]
    async fn test_create_link_store_reports_conflict_after_precheck() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_by_alias().returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .times(1)
            .returning(|new_link| Err(AppError::alias_conflict(&new_link.alias)));

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service
            .create_link(1, "https://example.com", Some("race".to_string()), vec![])
            .await;

        assert!(matches!(result.unwrap_err(), AppError::AliasConflict { .. }));
    }

    #[tokio::test]
    async fn test_create_link_reserved_alias() {
        let mock_repo = MockLinkRepository::new();
        let service = LinkService::new(Arc::new(mock_repo));

        let result = service
            .create_link(1, "https://example.com", Some("api".to_string()), vec![])
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_active() {
        let mut mock_repo = MockLinkRepository::new();

        let link = create_test_link(1, "abc123", "https://example.com", 1);
        mock_repo
            .expect_find_active_by_alias()
            .withf(|alias| alias == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let service = LinkService::new(Arc::new(mock_repo));

        let resolved = service.resolve("abc123").await.unwrap();
        assert_eq!(resolved.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_resolve_missing_or_inactive() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_active_by_alias()
            .returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service.resolve("nothing").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_owned_hides_foreign_links() {
        let mut mock_repo = MockLinkRepository::new();

        let link = create_test_link(4, "abc123", "https://example.com", 2);
        mock_repo
            .expect_find_by_id()
            .with(eq(4))
            .returning(move |_| Ok(Some(link.clone())));

        let service = LinkService::new(Arc::new(mock_repo));

        assert!(service.find_owned(4, 2).await.is_ok());
        assert!(matches!(
            service.find_owned(4, 1).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_update_link_not_found() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_update().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service.update_link(99, LinkPatch::default()).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_link_alias_taken_by_other() {
        let mut mock_repo = MockLinkRepository::new();

        let current = create_test_link(1, "mine", "https://example.com", 1);
        let other = create_test_link(2, "theirs", "https://other.com", 1);
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        mock_repo
            .expect_find_by_alias()
            .withf(|alias| alias == "theirs")
            .returning(move |_| Ok(Some(other.clone())));
        mock_repo.expect_update().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        let patch = LinkPatch {
            alias: Some("theirs".to_string()),
            ..Default::default()
        };
        let result = service.update_link(1, patch).await;

        assert!(matches!(result.unwrap_err(), AppError::AliasConflict { .. }));
    }

    #[tokio::test]
    async fn test_update_link_same_alias_skips_check() {
        let mut mock_repo = MockLinkRepository::new();

        let current = create_test_link(1, "mine", "https://example.com", 1);
        let updated = current.clone();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        mock_repo.expect_find_by_alias().times(0);
        mock_repo
            .expect_update()
            .withf(|id, patch| *id == 1 && patch.alias.is_none())
            .times(1)
            .returning(move |_, _| Ok(updated.clone()));

        let service = LinkService::new(Arc::new(mock_repo));

        let patch = LinkPatch {
            alias: Some("mine".to_string()),
            ..Default::default()
        };
        assert!(service.update_link(1, patch).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_link_rejects_bad_url() {
        let mut mock_repo = MockLinkRepository::new();

        let current = create_test_link(1, "mine", "https://example.com", 1);
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        mock_repo.expect_update().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        let patch = LinkPatch {
            original_url: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        let result = service.update_link(1, patch).await;

        assert!(matches!(result.unwrap_err(), AppError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_delete_link() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_delete().with(eq(1)).returning(|_| Ok(true));
        mock_repo.expect_delete().with(eq(2)).returning(|_| Ok(false));

        let service = LinkService::new(Arc::new(mock_repo));

        assert!(service.delete_link(1).await.is_ok());
        assert!(matches!(
            service.delete_link(2).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_links_passes_filters() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_list()
            .with(eq(Some(3)), eq(Some(5)))
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let service = LinkService::new(Arc::new(mock_repo));

        let links = service.list_links(Some(3), Some(5)).await.unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_get_short_url() {
        let service = LinkService::new(Arc::new(MockLinkRepository::new()));

        assert_eq!(
            service.get_short_url("https://s.example.com/", "abc123"),
            "https://s.example.com/abc123"
        );
    }
}
