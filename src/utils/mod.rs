//! Helper functions used across the application.
//!
//! - [`alias`] - Alias generation and validation
//! - [`url_validator`] - Destination URL validation
//! - [`client_info`] - Click attribute extraction from redirect requests

pub mod alias;
pub mod client_info;
pub mod url_validator;
