use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{policy::AuthzError, validation::Issue};

/// AppError
///
/// Every handler returns `Result<_, AppError>`. The variants map onto the three
/// externally visible failure classes (validation, authorization, unexpected) plus
/// the store outcomes a caller can act on (missing row, duplicate key).
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed path or body. Rendered as 422 with the full issue list.
    #[error("validation failed with {} issue(s)", .0.len())]
    Validation(Vec<Issue>),

    /// No session, or a role outside the operation's allowed set.
    #[error("unauthorized")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Missing rows and dangling foreign keys both mean the addressed entity does not
// exist; unique violations are duplicates. Everything else is unexpected.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return AppError::NotFound;
        }
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_foreign_key_violation() {
                return AppError::NotFound;
            }
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return AppError::Conflict(format!("{constraint} already exists"));
            }
        }
        AppError::Database(err)
    }
}

impl From<AuthzError> for AppError {
    fn from(_: AuthzError) -> Self {
        AppError::Unauthorized
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation(issues) => (status, Json(issues)).into_response(),
            AppError::Unauthorized => (status, "Unauthorized").into_response(),
            AppError::NotFound => status.into_response(),
            AppError::Conflict(message) => (
                status,
                Json(json!({
                    "error": {
                        "code": "conflict",
                        "message": message
                    }
                })),
            )
                .into_response(),
            AppError::Database(e) => {
                tracing::error!(error = ?e, "database error");
                status.into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                status.into_response()
            }
        }
    }
}
