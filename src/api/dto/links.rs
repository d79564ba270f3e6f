//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::{Link, LinkPatch};
use crate::utils::alias::validate_custom_alias;

/// Alias rules live in [`validate_custom_alias`]; this only adapts the error.
fn validate_alias(alias: &str) -> Result<(), ValidationError> {
    validate_custom_alias(alias)
        .map_err(|e| ValidationError::new("alias").with_message(e.to_string().into()))
}

/// Request body for `POST /api/links`.
///
/// The URL itself is checked by the link service, which reports
/// `INVALID_URL` rather than a generic validation error.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    pub original_url: String,

    /// Custom alias; a random one is generated when absent.
    #[validate(custom(function = "validate_alias"))]
    pub alias: Option<String>,

    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,
}

/// Request body for `PATCH /api/links/{id}`.
///
/// All fields are optional. Only provided fields are changed; an empty body
/// only refreshes `updated_at`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    pub original_url: Option<String>,

    #[validate(custom(function = "validate_alias"))]
    pub alias: Option<String>,

    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,

    /// Activates or deactivates the link. Inactive links do not resolve.
    pub is_active: Option<bool>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        Self {
            original_url: req.original_url,
            alias: req.alias,
            tags: req.tags,
            is_active: req.is_active,
        }
    }
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub alias: String,
    pub original_url: String,
    pub short_url: String,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn new(link: Link, short_url: String) -> Self {
        Self {
            id: link.id,
            alias: link.alias,
            original_url: link.original_url,
            short_url,
            is_active: link.is_active,
            tags: link.tags,
            clicks: link.clicks,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Response for `GET /api/links`.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub items: Vec<LinkResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_minimal() {
        let req: CreateLinkRequest =
            serde_json::from_str(r#"{"original_url": "https://example.com"}"#).unwrap();

        assert!(req.validate().is_ok());
        assert!(req.alias.is_none());
        assert!(req.tags.is_none());
    }

    #[test]
    fn test_create_request_rejects_bad_alias() {
        let too_short: CreateLinkRequest =
            serde_json::from_str(r#"{"original_url": "https://a.com", "alias": "ab"}"#).unwrap();
        let bad_chars: CreateLinkRequest =
            serde_json::from_str(r#"{"original_url": "https://a.com", "alias": "a b/c"}"#)
                .unwrap();

        assert!(too_short.validate().is_err());
        assert!(bad_chars.validate().is_err());
    }

    #[test]
    fn test_request_alias_rules_match_service_rules() {
        for alias in ["api", "health", "ab", "a.b", "Promo_2024", "abc-123"] {
            let create: CreateLinkRequest = serde_json::from_value(serde_json::json!({
                "original_url": "https://a.com",
                "alias": alias,
            }))
            .unwrap();
            let update = UpdateLinkRequest {
                alias: Some(alias.to_string()),
                ..Default::default()
            };

            let expected = validate_custom_alias(alias).is_ok();
            assert_eq!(create.validate().is_ok(), expected, "create {alias}");
            assert_eq!(update.validate().is_ok(), expected, "update {alias}");
        }
    }

    #[test]
    fn test_alias_error_carries_rule_message() {
        let req = UpdateLinkRequest {
            alias: Some("api".to_string()),
            ..Default::default()
        };

        let errors = req.validate().unwrap_err();
        let field = &errors.field_errors()["alias"][0];

        assert_eq!(field.message.as_deref(), Some("This alias is reserved"));
    }

    #[test]
    fn test_update_request_into_patch() {
        let req: UpdateLinkRequest =
            serde_json::from_str(r#"{"is_active": false, "tags": ["a"]}"#).unwrap();

        assert!(req.validate().is_ok());
        let patch: LinkPatch = req.into();
        assert_eq!(patch.is_active, Some(false));
        assert_eq!(patch.tags, Some(vec!["a".to_string()]));
        assert!(patch.alias.is_none());
        assert!(patch.original_url.is_none());
    }

    #[test]
    fn test_empty_update_is_empty_patch() {
        let req: UpdateLinkRequest = serde_json::from_str("{}").unwrap();
        let patch: LinkPatch = req.into();

        assert!(patch.is_empty());
    }
}
