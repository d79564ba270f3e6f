//! Repository implementations.
//!
//! Concrete implementations of domain repository traits: PostgreSQL via SQLx for
//! the running service, plus an in-process store with the same invariants.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Alias registry storage
//! - [`PgClickRepository`] - Click event log and range queries
//! - [`PgTokenRepository`] - API token storage and validation
//! - [`PgUserRepository`] - Link owners
//! - [`InMemoryStore`] - Link, click, token and user storage without a database

pub mod memory;
pub mod pg_click_repository;
pub mod pg_link_repository;
pub mod pg_token_repository;
pub mod pg_user_repository;

pub use memory::InMemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_user_repository::PgUserRepository;
