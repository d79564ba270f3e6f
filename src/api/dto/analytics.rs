//! DTOs for aggregated click counts.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::analytics::{AttributeCount, DateCount};

/// Clicks on one UTC calendar day.
#[derive(Debug, Serialize)]
pub struct DateCountResponse {
    pub date: NaiveDate,
    pub count: i64,
}

impl From<DateCount> for DateCountResponse {
    fn from(c: DateCount) -> Self {
        Self {
            date: c.date,
            count: c.count,
        }
    }
}

/// Response for `GET /api/links/{id}/clicks/daily`.
#[derive(Debug, Serialize)]
pub struct DailyClicksResponse {
    pub link_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub items: Vec<DateCountResponse>,
}

/// Clicks sharing one attribute value.
#[derive(Debug, Serialize)]
pub struct AttributeCountResponse {
    pub value: String,
    pub count: i64,
}

impl From<AttributeCount> for AttributeCountResponse {
    fn from(c: AttributeCount) -> Self {
        Self {
            value: c.value,
            count: c.count,
        }
    }
}

/// Response for `GET /api/analytics/{attribute}`.
#[derive(Debug, Serialize)]
pub struct AttributeCountsResponse {
    pub attribute: &'static str,
    pub items: Vec<AttributeCountResponse>,
}
