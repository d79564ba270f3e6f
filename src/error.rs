//! Application error type and its HTTP rendering.
//!
//! Every fallible operation in the service layers returns [`AppError`]. Handlers
//! return it directly; the [`IntoResponse`] impl turns it into a JSON body of the
//! form `{"error": {"code", "message", "details"}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Name of the unique constraint guarding link aliases.
pub const ALIAS_CONSTRAINT: &str = "links_alias_key";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Error kinds surfaced by the registry, recorder and HTTP layers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A destination URL failed syntax validation.
    #[error("{message}")]
    InvalidUrl { message: String, details: Value },

    /// Malformed input other than the destination URL.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The requested alias is held by another link.
    #[error("{message}")]
    AliasConflict { message: String, details: Value },

    /// Any other uniqueness violation (user email, token name).
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// The referenced record does not exist, or is not visible to the caller.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    /// Persistence failure. Fatal to the operation, never retried here.
    ///
    /// `transient` marks connection-level failures (I/O, TLS, pool exhaustion)
    /// as opposed to statements the store rejected.
    #[error("{message}")]
    Store {
        message: String,
        details: Value,
        transient: bool,
    },
}

impl AppError {
    pub fn invalid_url(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidUrl {
            message: message.into(),
            details,
        }
    }

    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn alias_conflict(alias: &str) -> Self {
        Self::AliasConflict {
            message: "Alias is already in use".to_string(),
            details: json!({ "alias": alias }),
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn store(message: impl Into<String>, details: Value) -> Self {
        Self::Store {
            message: message.into(),
            details,
            transient: false,
        }
    }

    /// Store failure caused by a lost or unavailable connection.
    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Store {
            message: message.into(),
            details,
            transient: true,
        }
    }

    /// Whether the failed operation may be repeated as is.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Store { transient: true, .. })
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidUrl { .. } => "invalid_url",
            AppError::Validation { .. } => "validation_error",
            AppError::AliasConflict { .. } => "alias_conflict",
            AppError::Conflict { .. } => "conflict",
            AppError::NotFound { .. } => "not_found",
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::Store { .. } => "store_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl { .. } | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::AliasConflict { .. } | AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing payload. Store failures never leak their details.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (message, details) = match self {
            AppError::Store { .. } => ("Internal server error".to_string(), json!({})),
            AppError::InvalidUrl { message, details }
            | AppError::Validation { message, details }
            | AppError::AliasConflict { message, details }
            | AppError::Conflict { message, details }
            | AppError::NotFound { message, details }
            | AppError::Unauthorized { message, details } => (message.clone(), details.clone()),
        };

        ErrorInfo {
            code: self.code(),
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Store {
            message, details, ..
        } = &self
        {
            tracing::error!(%message, %details, "Store failure");
        }

        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return match db.constraint() {
                Some(ALIAS_CONSTRAINT) => AppError::AliasConflict {
                    message: "Alias is already in use".to_string(),
                    details: json!({ "constraint": ALIAS_CONSTRAINT }),
                },
                constraint => AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": constraint }),
                ),
            };
        }

        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => {
                AppError::store_unavailable("Database unavailable", json!({ "reason": e.to_string() }))
            }
            _ => AppError::store("Database error", json!({ "reason": e.to_string() })),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();

        AppError::bad_request(
            "Request validation failed",
            json!({ "fields": fields, "reason": errors.to_string() }),
        )
    }
}
