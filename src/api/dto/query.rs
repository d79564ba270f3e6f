//! Query string parameters.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// Largest accepted `limit` for link and click listings.
pub const MAX_LIST_LIMIT: u32 = 1000;

/// Page size of click listings when no `limit` is given.
pub const DEFAULT_CLICK_LIMIT: u32 = 100;

/// Query parameters for `GET /api/links`.
///
/// Uses `serde_with` to parse the limit from the query string as an integer.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListLinksQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ListLinksQuery {
    /// Validates the limit and converts it for the repository.
    ///
    /// # Validation
    ///
    /// - Absent: no limit, the full set is returned
    /// - Must be between 1 and [`MAX_LIST_LIMIT`]
    pub fn validated_limit(&self) -> Result<Option<i64>, String> {
        match self.limit {
            None => Ok(None),
            Some(limit) if (1..=MAX_LIST_LIMIT).contains(&limit) => Ok(Some(i64::from(limit))),
            Some(_) => Err(format!("Limit must be between 1 and {MAX_LIST_LIMIT}")),
        }
    }
}

/// Query parameters for click listings.
///
/// Click history grows without bound, so listings are always paged.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ClickPageQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<u32>,
}

impl ClickPageQuery {
    /// Validates the page and converts it to `(limit, offset)`.
    ///
    /// # Defaults
    ///
    /// - `limit`: [`DEFAULT_CLICK_LIMIT`], at most [`MAX_LIST_LIMIT`]
    /// - `offset`: 0
    pub fn validated_page(&self) -> Result<(i64, i64), String> {
        let limit = self.limit.unwrap_or(DEFAULT_CLICK_LIMIT);

        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(format!("Limit must be between 1 and {MAX_LIST_LIMIT}"));
        }

        Ok((i64::from(limit), i64::from(self.offset.unwrap_or(0))))
    }
}

/// Inclusive range of UTC calendar dates, `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}
