//! Click recorder and aggregator.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::analytics::{AttributeCount, ClickAttribute, DateCount, day_window};
use crate::domain::entities::{Click, ClickAttributes, Link, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Service appending click events and grouping them for analytics.
///
/// Recording trusts the caller: the link passed in has already been resolved,
/// so it is never looked up again here. Read-side queries never fail for lack
/// of data; they return empty sequences instead.
pub struct ClickService {
    repository: Arc<dyn ClickRepository>,
}

impl ClickService {
    /// Creates a new click service.
    pub fn new(repository: Arc<dyn ClickRepository>) -> Self {
        Self { repository }
    }

    /// Appends a click event for an already resolved link.
    ///
    /// Attributes are stored as supplied; absent ones stay empty.
    ///
    /// In production this is called from the background worker
    /// (`click_worker`), not from the redirect handler.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on database errors.
    pub async fn record_click(
        &self,
        link: &Link,
        attributes: ClickAttributes,
    ) -> Result<Click, AppError> {
        self.repository
            .record(NewClick {
                link_id: link.id,
                attributes,
            })
            .await
    }

    /// Click events of one link, newest first.
    ///
    /// `limit: None` with `offset: 0` returns the whole history.
    pub async fn list_for_link(
        &self,
        link_id: i64,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        self.repository.list_for_link(link_id, limit, offset).await
    }

    /// Click events across all links of an owner, newest first.
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        self.repository.list_for_owner(owner_id, limit, offset).await
    }

    /// Per-day click counts of one link between two UTC calendar dates,
    /// both included.
    ///
    /// Sorted by date ascending; days without clicks are left out. An inverted
    /// range gives an empty result.
    pub async fn count_by_date_range(
        &self,
        link_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DateCount>, AppError> {
        let Some((from, until)) = day_window(start, end) else {
            return Ok(Vec::new());
        };

        self.repository
            .count_by_date_between(link_id, from, until)
            .await
    }

    /// Click counts across an owner's links grouped by one attribute.
    ///
    /// Clicks without a value for the attribute are counted as `"Unknown"`.
    pub async fn count_by_attribute(
        &self,
        owner_id: i64,
        attribute: ClickAttribute,
    ) -> Result<Vec<AttributeCount>, AppError> {
        self.repository.count_by_attribute(owner_id, attribute).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockClickRepository;
    use chrono::{DateTime, Utc};
    use mockall::predicate::eq;

    fn create_test_link(id: i64) -> Link {
        let now = Utc::now();
        Link {
            id,
            original_url: "https://example.com".to_string(),
            alias: "abc123".to_string(),
            is_active: true,
            tags: vec![],
            owner_id: 1,
            clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn click(id: i64, timestamp: &str) -> Click {
        Click {
            id,
            link_id: 1,
            attributes: ClickAttributes::default(),
            timestamp: timestamp.parse().unwrap(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_record_click_copies_attributes() {
        let mut mock_repo = MockClickRepository::new();

        mock_repo
            .expect_record()
            .withf(|new_click| {
                new_click.link_id == 7
                    && new_click.attributes.country.as_deref() == Some("DE")
                    && new_click.attributes.device.is_none()
            })
            .times(1)
            .returning(|new_click| {
                Ok(Click {
                    id: 1,
                    link_id: new_click.link_id,
                    attributes: new_click.attributes,
                    timestamp: Utc::now(),
                })
            });

        let service = ClickService::new(Arc::new(mock_repo));

        let attributes = ClickAttributes {
            country: Some("DE".to_string()),
            ..Default::default()
        };
        let click = service
            .record_click(&create_test_link(7), attributes)
            .await
            .unwrap();

        assert_eq!(click.link_id, 7);
        assert!(click.attributes.user_agent.is_none());
    }

    #[tokio::test]
    async fn test_list_for_owner_passes_page() {
        let mut mock_repo = MockClickRepository::new();

        mock_repo
            .expect_list_for_owner()
            .with(eq(3), eq(Some(2)), eq(4))
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![
                    click(6, "2024-01-02T00:00:00Z"),
                    click(5, "2024-01-01T00:00:00Z"),
                ])
            });

        let service = ClickService::new(Arc::new(mock_repo));

        let clicks = service.list_for_owner(3, Some(2), 4).await.unwrap();

        assert_eq!(clicks.len(), 2);
        assert_eq!(clicks[0].id, 6);
    }

    #[tokio::test]
    async fn test_count_by_date_range_queries_whole_days() {
        let mut mock_repo = MockClickRepository::new();

        let expected_from: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let expected_until: DateTime<Utc> = "2024-01-03T00:00:00Z".parse().unwrap();

        mock_repo
            .expect_count_by_date_between()
            .with(eq(1), eq(expected_from), eq(expected_until))
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![
                    DateCount {
                        date: "2024-01-01".parse().unwrap(),
                        count: 2,
                    },
                    DateCount {
                        date: "2024-01-02".parse().unwrap(),
                        count: 1,
                    },
                ])
            });

        let service = ClickService::new(Arc::new(mock_repo));

        let counts = service
            .count_by_date_range(1, date("2024-01-01"), date("2024-01-02"))
            .await
            .unwrap();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].date, date("2024-01-01"));
        assert_eq!(counts[0].count, 2);
    }

    #[tokio::test]
    async fn test_count_by_date_range_inverted_is_empty() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo.expect_count_by_date_between().times(0);

        let service = ClickService::new(Arc::new(mock_repo));

        let counts = service
            .count_by_date_range(1, date("2024-02-01"), date("2024-01-01"))
            .await
            .unwrap();

        assert!(counts.is_empty());
    }

    #[tokio::test]
    async fn test_count_by_attribute_delegates_grouping() {
        let mut mock_repo = MockClickRepository::new();

        mock_repo
            .expect_count_by_attribute()
            .with(eq(1), eq(ClickAttribute::Browser))
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    AttributeCount {
                        value: "Chrome".to_string(),
                        count: 2,
                    },
                    AttributeCount {
                        value: "Unknown".to_string(),
                        count: 2,
                    },
                ])
            });
        mock_repo.expect_list_for_owner().times(0);

        let service = ClickService::new(Arc::new(mock_repo));

        let counts = service
            .count_by_attribute(1, ClickAttribute::Browser)
            .await
            .unwrap();

        let pairs: Vec<(&str, i64)> = counts.iter().map(|c| (c.value.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("Chrome", 2), ("Unknown", 2)]);
    }
}
