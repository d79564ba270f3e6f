//! DTOs for click event data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Click;

/// Individual click event information.
///
/// Optional fields are omitted from JSON when `None` for cleaner responses.
#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub id: i64,
    pub link_id: i64,
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

impl From<Click> for ClickResponse {
    fn from(click: Click) -> Self {
        let a = click.attributes;
        Self {
            id: click.id,
            link_id: click.link_id,
            timestamp: click.timestamp,
            ip_address: a.ip_address,
            user_agent: a.user_agent,
            referrer: a.referrer,
            country: a.country,
            city: a.city,
            device: a.device,
            browser: a.browser,
        }
    }
}

/// Click events, newest first.
#[derive(Debug, Serialize)]
pub struct ClickListResponse {
    pub items: Vec<ClickResponse>,
    pub total: usize,
}

impl From<Vec<Click>> for ClickListResponse {
    fn from(clicks: Vec<Click>) -> Self {
        let items: Vec<ClickResponse> = clicks.into_iter().map(ClickResponse::from).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}
