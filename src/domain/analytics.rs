//! Read-side grouping of click events.
//!
//! These are pure functions over already-fetched [`Click`] records. Dates are
//! bucketed by the UTC calendar day of the click timestamp.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::domain::entities::Click;

/// Label used for clicks whose grouping attribute is missing or empty.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Click attribute that can be used as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickAttribute {
    Device,
    Browser,
    Country,
}

impl ClickAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClickAttribute::Device => "device",
            ClickAttribute::Browser => "browser",
            ClickAttribute::Country => "country",
        }
    }

    /// Extracts this attribute from a click, if present.
    pub fn value_of<'a>(&self, click: &'a Click) -> Option<&'a str> {
        let value = match self {
            ClickAttribute::Device => &click.attributes.device,
            ClickAttribute::Browser => &click.attributes.browser,
            ClickAttribute::Country => &click.attributes.country,
        };
        value.as_deref()
    }
}

impl fmt::Display for ClickAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported click attribute: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for ClickAttribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "device" => Ok(ClickAttribute::Device),
            "browser" => Ok(ClickAttribute::Browser),
            "country" => Ok(ClickAttribute::Country),
            other => Err(UnknownAttribute(other.to_string())),
        }
    }
}

/// Number of clicks on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Number of clicks sharing one attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeCount {
    pub value: String,
    pub count: i64,
}

/// Converts an inclusive calendar-date range into a half-open timestamp window
/// `[start 00:00Z, end + 1 day 00:00Z)`.
///
/// Returns `None` when `start > end`. When `end` is the last representable
/// date the window is open up to [`DateTime::<Utc>::MAX_UTC`].
pub fn day_window(start: NaiveDate, end: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if start > end {
        return None;
    }

    let from = start.and_time(NaiveTime::MIN).and_utc();
    let until = end
        .succ_opt()
        .map_or(DateTime::<Utc>::MAX_UTC, |next| next.and_time(NaiveTime::MIN).and_utc());

    Some((from, until))
}

/// Groups clicks by UTC calendar date, ascending. Days without clicks are omitted.
pub fn count_by_date<'a>(clicks: impl IntoIterator<Item = &'a Click>) -> Vec<DateCount> {
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();

    for click in clicks {
        *buckets.entry(click.timestamp.date_naive()).or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect()
}

/// Groups clicks by the given attribute.
///
/// Missing or empty values fall under [`UNKNOWN_LABEL`]. The result is sorted by
/// count descending, then by value, so repeated calls return the same sequence.
pub fn count_by_attribute<'a>(
    clicks: impl IntoIterator<Item = &'a Click>,
    attribute: ClickAttribute,
) -> Vec<AttributeCount> {
    let mut buckets: HashMap<&str, i64> = HashMap::new();

    for click in clicks {
        let value = attribute
            .value_of(click)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_LABEL);
        *buckets.entry(value).or_default() += 1;
    }

    let mut counts: Vec<AttributeCount> = buckets
        .into_iter()
        .map(|(value, count)| AttributeCount {
            value: value.to_string(),
            count,
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    counts
}
