//! Central error type and HTTP translation.
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse` impl is
//! the single place domain failures are mapped to status codes and the
//! `{ success: false, error }` body. Ownership misses are reported as 404
//! rather than 403 so foreign resource ids are indistinguishable from
//! missing ones.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ApiError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Duplicate field value entered")]
    Duplicate,
    #[error("Server Error")]
    Database(sqlx::Error),
    #[error("Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Duplicate => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // Unique-constraint violations (e.g. duplicate email) are a client
        // problem, everything else from the database is a 500.
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::Duplicate;
            }
        }
        AppError::Database(err)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                AppError::Database(e) => error!("database error: {e}"),
                AppError::Internal(e) => error!("internal error: {e:#}"),
                _ => {}
            }
        }
        let body = ApiError {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_variants() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Duplicate.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn row_not_found_is_a_server_error() {
        // Missing rows are detected by the services and reported as typed
        // NotFound errors; a RowNotFound leaking out of sqlx is a bug.
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::Internal(anyhow::anyhow!("secret detail"));
        assert_eq!(err.to_string(), "Server Error");
    }
}
