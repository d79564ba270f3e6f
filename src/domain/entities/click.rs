//! Click entity representing a single resolution of a short link.

use chrono::{DateTime, Utc};

/// Descriptive metadata supplied with a click.
///
/// Every field is independently optional. Nothing is inferred or defaulted at
/// write time; absent values are stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickAttributes {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
}

/// A recorded click event. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub attributes: ClickAttributes,
    pub timestamp: DateTime<Utc>,
}

/// Input data for recording a new click event.
///
/// `link_id` must reference an existing link; the timestamp is set by the store.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub attributes: ClickAttributes,
}
