//! In-process store implementing the repository traits.
//!
//! Keeps the same invariants as the PostgreSQL schema (unique aliases, cascade
//! on link deletion, derived click counts, newest-first ordering) so services and
//! handlers can be exercised without a database.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::analytics::{
    AttributeCount, ClickAttribute, DateCount, count_by_attribute, count_by_date,
};
use crate::domain::entities::{Click, Link, LinkPatch, NewClick, NewLink, NewUser, User};
use crate::domain::repositories::{
    ApiToken, ClickRepository, LinkRepository, TokenRepository, UserRepository,
};
use crate::error::AppError;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    links: BTreeMap<i64, Link>,
    clicks: BTreeMap<i64, Click>,
    tokens: BTreeMap<i64, ApiToken>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn alias_taken(&self, alias: &str, except: Option<i64>) -> bool {
        self.links
            .values()
            .any(|l| l.alias == alias && Some(l.id) != except)
    }

    fn with_clicks(&self, link: &Link) -> Link {
        let mut link = link.clone();
        link.clicks = self.clicks.values().filter(|c| c.link_id == link.id).count() as i64;
        link
    }

    fn record_at(
        &mut self,
        new_click: NewClick,
        timestamp: DateTime<Utc>,
    ) -> Result<Click, AppError> {
        if !self.links.contains_key(&new_click.link_id) {
            return Err(AppError::store(
                "Database error",
                json!({ "reason": "click references a missing link" }),
            ));
        }

        let click = Click {
            id: self.next_id(),
            link_id: new_click.link_id,
            attributes: new_click.attributes,
            timestamp,
        };
        self.clicks.insert(click.id, click.clone());
        Ok(click)
    }
}

/// Repository backed by in-memory maps behind a single lock.
///
/// Every operation runs under the lock, so check-and-insert of an alias is
/// atomic: concurrent creates with the same alias yield exactly one winner.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::store("Store lock poisoned", json!({})))
    }

    /// Records a click with an explicit timestamp.
    ///
    /// Lets tests place events on chosen calendar days.
    pub fn record_click_at(
        &self,
        new_click: NewClick,
        timestamp: DateTime<Utc>,
    ) -> Result<Click, AppError> {
        self.lock()?.record_at(new_click, timestamp)
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut tables = self.lock()?;

        if tables.alias_taken(&new_link.alias, None) {
            return Err(AppError::alias_conflict(&new_link.alias));
        }

        let now = Utc::now();
        let link = Link {
            id: tables.next_id(),
            original_url: new_link.original_url,
            alias: new_link.alias,
            is_active: true,
            tags: new_link.tags,
            owner_id: new_link.owner_id,
            clicks: 0,
            created_at: now,
            updated_at: now,
        };
        tables.links.insert(link.id, link.clone());

        Ok(link)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let tables = self.lock()?;
        Ok(tables.links.get(&id).map(|l| tables.with_clicks(l)))
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .links
            .values()
            .find(|l| l.alias == alias)
            .map(|l| tables.with_clicks(l)))
    }

    async fn find_active_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .links
            .values()
            .find(|l| l.alias == alias && l.is_active)
            .map(|l| tables.with_clicks(l)))
    }

    async fn list(
        &self,
        owner_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Link>, AppError> {
        let tables = self.lock()?;

        let mut links: Vec<Link> = tables
            .links
            .values()
            .filter(|l| owner_id.is_none_or(|owner| l.owner_id == owner))
            .map(|l| tables.with_clicks(l))
            .collect();
        newest_first(&mut links, |l| (l.created_at, l.id));

        if let Some(limit) = limit {
            links.truncate(usize::try_from(limit).unwrap_or(0));
        }

        Ok(links)
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        let mut tables = self.lock()?;

        if let Some(alias) = patch.alias.as_deref()
            && tables.alias_taken(alias, Some(id))
        {
            return Err(AppError::alias_conflict(alias));
        }

        let Some(link) = tables.links.get_mut(&id) else {
            return Err(AppError::not_found("Link not found", json!({ "id": id })));
        };
        patch.apply_to(link);
        link.updated_at = Utc::now().max(link.updated_at);
        let link = link.clone();

        Ok(tables.with_clicks(&link))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.lock()?;

        if tables.links.remove(&id).is_none() {
            return Ok(false);
        }
        tables.clicks.retain(|_, c| c.link_id != id);

        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

impl Tables {
    fn clicks_where(&self, keep: impl Fn(&Click) -> bool) -> Vec<Click> {
        let mut clicks: Vec<Click> = self.clicks.values().filter(|c| keep(c)).cloned().collect();
        newest_first(&mut clicks, |c| (c.timestamp, c.id));
        clicks
    }

    fn owns(&self, owner_id: i64, click: &Click) -> bool {
        self.links
            .get(&click.link_id)
            .is_some_and(|l| l.owner_id == owner_id)
    }
}

fn page<T>(items: Vec<T>, limit: Option<i64>, offset: i64) -> Vec<T> {
    let skip = usize::try_from(offset).unwrap_or(0);
    let take = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));
    items.into_iter().skip(skip).take(take).collect()
}

#[async_trait]
impl ClickRepository for InMemoryStore {
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError> {
        self.lock()?.record_at(new_click, Utc::now())
    }

    async fn list_for_link(
        &self,
        link_id: i64,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        let clicks = self.lock()?.clicks_where(|c| c.link_id == link_id);
        Ok(page(clicks, limit, offset))
    }

    async fn list_for_owner(
        &self,
        owner_id: i64,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        let tables = self.lock()?;
        let clicks = tables.clicks_where(|c| tables.owns(owner_id, c));
        Ok(page(clicks, limit, offset))
    }

    async fn count_by_date_between(
        &self,
        link_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DateCount>, AppError> {
        let clicks = self.lock()?.clicks_where(|c| {
            c.link_id == link_id && c.timestamp >= from && c.timestamp < until
        });
        Ok(count_by_date(&clicks))
    }

    async fn count_by_attribute(
        &self,
        owner_id: i64,
        attribute: ClickAttribute,
    ) -> Result<Vec<AttributeCount>, AppError> {
        let tables = self.lock()?;
        let clicks = tables.clicks_where(|c| tables.owns(owner_id, c));
        Ok(count_by_attribute(&clicks, attribute))
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn find_owner(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .tokens
            .values()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .map(|t| t.user_id))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        if let Some(token) = tables
            .tokens
            .values_mut()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut tables = self.lock()?;

        if tables
            .tokens
            .values()
            .any(|t| t.name == name || t.token_hash == token_hash)
        {
            return Err(AppError::conflict(
                "Resource already exists",
                json!({ "constraint": "api_tokens_name_key" }),
            ));
        }

        let token = ApiToken {
            id: tables.next_id(),
            user_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tables.tokens.insert(token.id, token.clone());

        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let tables = self.lock()?;
        let mut tokens: Vec<ApiToken> = tables.tokens.values().cloned().collect();
        newest_first(&mut tokens, |t| (t.created_at, t.id));
        Ok(tokens)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        Ok(self.lock()?.tokens.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .lock()?
            .tokens
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        let Some(token) = tables.tokens.get_mut(&id) else {
            return Err(AppError::not_found("Token not found", json!({ "id": id })));
        };
        token.revoked_at.get_or_insert_with(Utc::now);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.lock()?;

        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict(
                "Resource already exists",
                json!({ "constraint": "users_email_key" }),
            ));
        }

        let user = User {
            id: tables.next_id(),
            email: new_user.email,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }
}
