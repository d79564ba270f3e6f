//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without persistence concerns.
//!
//! # Entity Types
//!
//! - [`Link`] - An aliased short link
//! - [`Click`] - A recorded resolution of a link
//! - [`User`] - The owner of links and API tokens
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! - `NewLink`, `NewClick`, `NewUser` - For creating new records
//! - `LinkPatch` - For partial updates

pub mod click;
pub mod link;
pub mod user;

pub use click::{Click, ClickAttributes, NewClick};
pub use link::{Link, LinkPatch, NewLink};
pub use user::{NewUser, User};
