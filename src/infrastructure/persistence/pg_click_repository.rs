//! PostgreSQL implementation of the click log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::analytics::{AttributeCount, ClickAttribute, DateCount};
use crate::domain::entities::{Click, ClickAttributes, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

struct ClickRow {
    id: i64,
    link_id: i64,
    ip_address: Option<String>,
    user_agent: Option<String>,
    referrer: Option<String>,
    country: Option<String>,
    city: Option<String>,
    device: Option<String>,
    browser: Option<String>,
    clicked_at: DateTime<Utc>,
}

impl From<ClickRow> for Click {
    fn from(row: ClickRow) -> Self {
        Self {
            id: row.id,
            link_id: row.link_id,
            attributes: ClickAttributes {
                ip_address: row.ip_address,
                user_agent: row.user_agent,
                referrer: row.referrer,
                country: row.country,
                city: row.city,
                device: row.device,
                browser: row.browser,
            },
            timestamp: row.clicked_at,
        }
    }
}

/// PostgreSQL repository for click events.
///
/// Rows are only ever inserted; they are removed by the cascade when their link
/// is deleted.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError> {
        let attributes = new_click.attributes;

        let row = sqlx::query_as!(
            ClickRow,
            r#"
            INSERT INTO click_events
                (link_id, ip_address, user_agent, referrer, country, city, device, browser)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, link_id, ip_address, user_agent, referrer, country, city,
                      device, browser, clicked_at
            "#,
            new_click.link_id,
            attributes.ip_address,
            attributes.user_agent,
            attributes.referrer,
            attributes.country,
            attributes.city,
            attributes.device,
            attributes.browser
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_for_link(
        &self,
        link_id: i64,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as!(
            ClickRow,
            r#"
            SELECT id, link_id, ip_address, user_agent, referrer, country, city,
                   device, browser, clicked_at
            FROM click_events
            WHERE link_id = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            link_id,
            limit,
            offset
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn list_for_owner(
        &self,
        owner_id: i64,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as!(
            ClickRow,
            r#"
            SELECT c.id, c.link_id, c.ip_address, c.user_agent, c.referrer, c.country,
                   c.city, c.device, c.browser, c.clicked_at
            FROM click_events c
            JOIN links l ON l.id = c.link_id
            WHERE l.owner_id = $1
            ORDER BY c.clicked_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
            owner_id,
            limit,
            offset
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn count_by_date_between(
        &self,
        link_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DateCount>, AppError> {
        let rows = sqlx::query!(
            r#"
            SELECT
                (clicked_at AT TIME ZONE 'UTC')::DATE as "date!",
                COUNT(*) as "count!"
            FROM click_events
            WHERE link_id = $1
              AND clicked_at >= $2
              AND clicked_at < $3
            GROUP BY 1
            ORDER BY 1
            "#,
            link_id,
            from,
            until
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DateCount {
                date: r.date,
                count: r.count,
            })
            .collect())
    }

    async fn count_by_attribute(
        &self,
        owner_id: i64,
        attribute: ClickAttribute,
    ) -> Result<Vec<AttributeCount>, AppError> {
        // One literal query per column. Values sort by byte order ("C") to match
        // the in-process grouping.
        let rows: Vec<(String, i64)> = match attribute {
            ClickAttribute::Device => sqlx::query!(
                r#"
                SELECT
                    COALESCE(NULLIF(c.device, ''), 'Unknown') as "value!",
                    COUNT(*) as "count!"
                FROM click_events c
                JOIN links l ON l.id = c.link_id
                WHERE l.owner_id = $1
                GROUP BY 1
                ORDER BY COUNT(*) DESC, COALESCE(NULLIF(c.device, ''), 'Unknown') COLLATE "C"
                "#,
                owner_id
            )
            .fetch_all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|r| (r.value, r.count))
            .collect(),
            ClickAttribute::Browser => sqlx::query!(
                r#"
                SELECT
                    COALESCE(NULLIF(c.browser, ''), 'Unknown') as "value!",
                    COUNT(*) as "count!"
                FROM click_events c
                JOIN links l ON l.id = c.link_id
                WHERE l.owner_id = $1
                GROUP BY 1
                ORDER BY COUNT(*) DESC, COALESCE(NULLIF(c.browser, ''), 'Unknown') COLLATE "C"
                "#,
                owner_id
            )
            .fetch_all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|r| (r.value, r.count))
            .collect(),
            ClickAttribute::Country => sqlx::query!(
                r#"
                SELECT
                    COALESCE(NULLIF(c.country, ''), 'Unknown') as "value!",
                    COUNT(*) as "count!"
                FROM click_events c
                JOIN links l ON l.id = c.link_id
                WHERE l.owner_id = $1
                GROUP BY 1
                ORDER BY COUNT(*) DESC, COALESCE(NULLIF(c.country, ''), 'Unknown') COLLATE "C"
                "#,
                owner_id
            )
            .fetch_all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|r| (r.value, r.count))
            .collect(),
        };

        Ok(rows
            .into_iter()
            .map(|(value, count)| AttributeCount { value, count })
            .collect())
    }
}
