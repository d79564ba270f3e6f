//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

struct LinkRow {
    id: i64,
    original_url: String,
    alias: String,
    is_active: bool,
    tags: Vec<String>,
    owner_id: i64,
    clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Self {
            id: row.id,
            original_url: row.original_url,
            alias: row.alias,
            is_active: row.is_active,
            tags: row.tags,
            owner_id: row.owner_id,
            clicks: row.clicks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL repository for the alias registry.
///
/// Alias uniqueness is enforced by the `links_alias_key` constraint; its
/// violation surfaces as [`AppError::AliasConflict`] through
/// `From<sqlx::Error>`. The `clicks` field is computed per query and never
/// stored.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as!(
            LinkRow,
            r#"
            WITH inserted AS (
                INSERT INTO links (original_url, alias, tags, owner_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, original_url, alias, is_active, tags, owner_id,
                          created_at, updated_at
            )
            SELECT
                id as "id!",
                original_url as "original_url!",
                alias as "alias!",
                is_active as "is_active!",
                tags as "tags!",
                owner_id as "owner_id!",
                0::BIGINT as "clicks!",
                created_at as "created_at!",
                updated_at as "updated_at!"
            FROM inserted
            "#,
            new_link.original_url,
            new_link.alias,
            &new_link.tags[..],
            new_link.owner_id
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as!(
            LinkRow,
            r#"
            SELECT
                l.id, l.original_url, l.alias, l.is_active, l.tags, l.owner_id,
                (SELECT COUNT(*) FROM click_events c WHERE c.link_id = l.id) as "clicks!",
                l.created_at, l.updated_at
            FROM links l
            WHERE l.id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as!(
            LinkRow,
            r#"
            SELECT
                l.id, l.original_url, l.alias, l.is_active, l.tags, l.owner_id,
                (SELECT COUNT(*) FROM click_events c WHERE c.link_id = l.id) as "clicks!",
                l.created_at, l.updated_at
            FROM links l
            WHERE l.alias = $1
            "#,
            alias
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_active_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as!(
            LinkRow,
            r#"
            SELECT
                l.id, l.original_url, l.alias, l.is_active, l.tags, l.owner_id,
                (SELECT COUNT(*) FROM click_events c WHERE c.link_id = l.id) as "clicks!",
                l.created_at, l.updated_at
            FROM links l
            WHERE l.alias = $1
              AND l.is_active
            "#,
            alias
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list(
        &self,
        owner_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Link>, AppError> {
        // LIMIT NULL means no limit in PostgreSQL.
        let rows = sqlx::query_as!(
            LinkRow,
            r#"
            SELECT
                l.id, l.original_url, l.alias, l.is_active, l.tags, l.owner_id,
                (SELECT COUNT(*) FROM click_events c WHERE c.link_id = l.id) as "clicks!",
                l.created_at, l.updated_at
            FROM links l
            WHERE ($1::BIGINT IS NULL OR l.owner_id = $1)
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $2
            "#,
            owner_id,
            limit
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        let row = sqlx::query_as!(
            LinkRow,
            r#"
            WITH updated AS (
                UPDATE links
                SET original_url = COALESCE($2::TEXT, original_url),
                    alias = COALESCE($3::TEXT, alias),
                    tags = COALESCE($4::TEXT[], tags),
                    is_active = COALESCE($5::BOOLEAN, is_active),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, original_url, alias, is_active, tags, owner_id,
                          created_at, updated_at
            )
            SELECT
                u.id as "id!",
                u.original_url as "original_url!",
                u.alias as "alias!",
                u.is_active as "is_active!",
                u.tags as "tags!",
                u.owner_id as "owner_id!",
                (SELECT COUNT(*) FROM click_events c WHERE c.link_id = u.id) as "clicks!",
                u.created_at as "created_at!",
                u.updated_at as "updated_at!"
            FROM updated u
            "#,
            id,
            patch.original_url,
            patch.alias,
            patch.tags.as_deref(),
            patch.is_active
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        // click_events rows go with the link (ON DELETE CASCADE).
        let result = sqlx::query!("DELETE FROM links WHERE id = $1", id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
