#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum::routing::get;
use axum::{Router, middleware};
use axum_test::TestServer;
use link_registry::api::handlers::{health_handler, redirect_handler};
use link_registry::api::middleware::auth;
use link_registry::api::routes::protected_routes;
use link_registry::application::services::{AuthService, ClickService, LinkService};
use link_registry::domain::click_event::ClickEvent;
use link_registry::domain::entities::{Link, NewLink, NewUser};
use link_registry::domain::repositories::{LinkRepository, TokenRepository, UserRepository};
use link_registry::infrastructure::persistence::InMemoryStore;
use link_registry::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::Layer;

pub const TEST_TOKEN: &str = "test-token";
pub const OTHER_TOKEN: &str = "other-token";
pub const BASE_URL: &str = "https://s.example.com";

/// Everything a test needs: the state, the store behind it, the receiving end
/// of the click queue and two registered owners with tokens.
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub state: AppState,
    pub rx: mpsc::Receiver<ClickEvent>,
    pub owner_id: i64,
    pub other_owner_id: i64,
}

pub async fn create_test_context() -> TestContext {
    let store = Arc::new(InMemoryStore::new());
    let (tx, rx) = mpsc::channel(100);

    let link_service = Arc::new(LinkService::new(store.clone()));
    let click_service = Arc::new(ClickService::new(store.clone()));
    let auth_service = Arc::new(AuthService::new(
        store.clone(),
        "test-signing-secret".to_string(),
    ));

    let owner_id = create_owner(&store, &auth_service, "owner@example.com", TEST_TOKEN).await;
    let other_owner_id =
        create_owner(&store, &auth_service, "other@example.com", OTHER_TOKEN).await;

    let state = AppState::new(
        link_service,
        click_service,
        auth_service,
        tx,
        BASE_URL.to_string(),
    );

    TestContext {
        store,
        state,
        rx,
        owner_id,
        other_owner_id,
    }
}

async fn create_owner(
    store: &InMemoryStore,
    auth_service: &AuthService,
    email: &str,
    token: &str,
) -> i64 {
    let user = UserRepository::create(
        store,
        NewUser {
            email: email.to_string(),
        },
    )
    .await
    .unwrap();

    store
        .create_token(user.id, email, &auth_service.hash_token(token))
        .await
        .unwrap();

    user.id
}

pub async fn create_test_link(store: &InMemoryStore, owner_id: i64, alias: &str, url: &str) -> Link {
    LinkRepository::create(
        store,
        NewLink {
            original_url: url.to_string(),
            alias: alias.to_string(),
            tags: vec![],
            owner_id,
        },
    )
    .await
    .unwrap()
}

/// Full routing table without rate limiting: the API behind bearer auth, the
/// redirect route and the health check.
pub fn create_test_server(state: AppState) -> TestServer {
    let api = protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::layer,
    ));

    let app = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .route("/{alias}", get(redirect_handler))
        .layer(MockConnectInfoLayer)
        .with_state(state);

    TestServer::new(app).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "203.0.113.7:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Inserts a user directly for PostgreSQL-backed tests.
pub async fn create_pg_user(pool: &sqlx::PgPool, email: &str) -> i64 {
    sqlx::query_scalar!("INSERT INTO users (email) VALUES ($1) RETURNING id", email)
        .fetch_one(pool)
        .await
        .unwrap()
}
