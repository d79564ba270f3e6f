mod common;

use link_registry::domain::entities::{ClickAttributes, LinkPatch, NewClick, NewLink};
use link_registry::domain::repositories::{ClickRepository, LinkRepository};
use link_registry::error::AppError;
use link_registry::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use sqlx::PgPool;
use std::sync::Arc;

fn new_link(alias: &str, owner_id: i64) -> NewLink {
    NewLink {
        original_url: "https://example.com".to_string(),
        alias: alias.to_string(),
        tags: vec!["promo".to_string()],
        owner_id,
    }
}

#[sqlx::test]
async fn test_create_link(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.create(new_link("test123", owner_id)).await.unwrap();

    assert_eq!(link.alias, "test123");
    assert_eq!(link.original_url, "https://example.com");
    assert_eq!(link.tags, vec!["promo".to_string()]);
    assert!(link.is_active);
    assert_eq!(link.clicks, 0);
}

#[sqlx::test]
async fn test_duplicate_alias_is_conflict(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(new_link("dup", owner_id)).await.unwrap();
    let result = repo.create(new_link("dup", owner_id)).await;

    assert!(matches!(result, Err(AppError::AliasConflict { .. })));
}

#[sqlx::test]
async fn test_concurrent_creates_with_same_alias_have_one_winner(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let (first, second) = tokio::join!(
        repo.create(new_link("race", owner_id)),
        repo.create(new_link("race", owner_id))
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(AppError::AliasConflict { .. })))
    );
    assert!(repo.find_by_alias("race").await.unwrap().is_some());
}

#[sqlx::test]
async fn test_alias_lookup_is_case_sensitive(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(new_link("MixedCase", owner_id)).await.unwrap();

    assert!(repo.find_by_alias("MixedCase").await.unwrap().is_some());
    assert!(repo.find_by_alias("mixedcase").await.unwrap().is_none());
    // Different case is a different alias.
    assert!(repo.create(new_link("mixedcase", owner_id)).await.is_ok());
}

#[sqlx::test]
async fn test_find_active_by_alias_skips_inactive(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.create(new_link("sleepy", owner_id)).await.unwrap();
    repo.update(
        link.id,
        LinkPatch {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(repo.find_active_by_alias("sleepy").await.unwrap().is_none());
    assert!(repo.find_by_alias("sleepy").await.unwrap().is_some());
}

#[sqlx::test]
async fn test_update_partial_and_empty(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.create(new_link("patch", owner_id)).await.unwrap();

    let updated = repo
        .update(
            link.id,
            LinkPatch {
                original_url: Some("https://example.com/new".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.original_url, "https://example.com/new");
    assert_eq!(updated.alias, "patch");
    assert_eq!(updated.tags, link.tags);

    let untouched = repo.update(link.id, LinkPatch::default()).await.unwrap();
    assert_eq!(untouched.original_url, updated.original_url);
    assert_eq!(untouched.alias, updated.alias);
    assert_eq!(untouched.is_active, updated.is_active);
    assert!(untouched.updated_at >= updated.updated_at);
}

#[sqlx::test]
async fn test_update_missing_is_not_found(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let result = repo.update(999_999, LinkPatch::default()).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_list_filters_orders_and_limits(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let other_id = common::create_pg_user(&pool, "b@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(new_link("first", owner_id)).await.unwrap();
    repo.create(new_link("second", owner_id)).await.unwrap();
    repo.create(new_link("foreign", other_id)).await.unwrap();

    let own = repo.list(Some(owner_id), None).await.unwrap();
    assert_eq!(own.len(), 2);
    assert_eq!(own[0].alias, "second");

    let limited = repo.list(Some(owner_id), Some(1)).await.unwrap();
    assert_eq!(limited.len(), 1);

    let all = repo.list(None, None).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[sqlx::test]
async fn test_clicks_projection_and_cascade(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let pool = Arc::new(pool);
    let links = PgLinkRepository::new(pool.clone());
    let clicks = PgClickRepository::new(pool);

    let link = links.create(new_link("counted", owner_id)).await.unwrap();
    for _ in 0..3 {
        clicks
            .record(NewClick {
                link_id: link.id,
                attributes: ClickAttributes::default(),
            })
            .await
            .unwrap();
    }

    assert_eq!(links.find_by_id(link.id).await.unwrap().unwrap().clicks, 3);

    assert!(links.delete(link.id).await.unwrap());
    assert!(clicks.list_for_link(link.id, None, 0).await.unwrap().is_empty());
    assert!(links.find_by_id(link.id).await.unwrap().is_none());
    assert!(!links.delete(link.id).await.unwrap());
}

#[sqlx::test]
async fn test_update_replaces_tags_and_keeps_click_count(pool: PgPool) {
    let owner_id = common::create_pg_user(&pool, "a@example.com").await;
    let pool = Arc::new(pool);
    let links = PgLinkRepository::new(pool.clone());
    let clicks = PgClickRepository::new(pool);

    let link = links.create(new_link("tagged", owner_id)).await.unwrap();
    clicks
        .record(NewClick {
            link_id: link.id,
            attributes: ClickAttributes::default(),
        })
        .await
        .unwrap();

    let updated = links
        .update(
            link.id,
            LinkPatch {
                tags: Some(vec![]),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.tags.is_empty());
    assert!(!updated.is_active);
    assert_eq!(updated.clicks, 1);
}

#[sqlx::test]
async fn test_ping(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.ping().await.is_ok());
}
