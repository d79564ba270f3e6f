//! Link entity representing an aliased short link.

use chrono::{DateTime, Utc};

/// A short link owned by a user.
///
/// `clicks` is a query-time projection (count of the link's click events) and is
/// never written back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub original_url: String,
    pub alias: String,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub owner_id: i64,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link belongs to `owner_id`.
    pub fn is_owned_by(&self, owner_id: i64) -> bool {
        self.owner_id == owner_id
    }
}

/// Input data for inserting a new link.
///
/// The alias is already decided (custom or generated) by the time this reaches
/// the repository. New links always start active.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub original_url: String,
    pub alias: String,
    pub tags: Vec<String>,
    pub owner_id: i64,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged. An empty patch only refreshes `updated_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPatch {
    pub original_url: Option<String>,
    pub alias: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.original_url.is_none()
            && self.alias.is_none()
            && self.tags.is_none()
            && self.is_active.is_none()
    }

    /// Applies the provided fields to `link` in place.
    pub fn apply_to(&self, link: &mut Link) {
        if let Some(url) = &self.original_url {
            link.original_url = url.clone();
        }
        if let Some(alias) = &self.alias {
            link.alias = alias.clone();
        }
        if let Some(tags) = &self.tags {
            link.tags = tags.clone();
        }
        if let Some(active) = self.is_active {
            link.is_active = active;
        }
    }
}
