use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication token is missing")]
    MissingToken,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token is malformed")]
    MalformedToken,

    #[error("Insufficient permissions")]
    Forbidden,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::Database(DatabaseError::NotFound),
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
                AppError::Database(DatabaseError::Duplicate)
            }
            _ => AppError::Database(DatabaseError::QueryError(err.to_string())),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(DatabaseError::QueryError(err.to_string()))
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Token failures are reported with one uniform message so callers cannot
        // tell expired from tampered; the distinction stays in server-side logs.
        let message = match self {
            AppError::Auth(
                e @ (AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::MalformedToken),
            ) => {
                debug!("rejected token: {}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Auth(e) => e.to_string(),
            AppError::Validation(reason) => reason.clone(),
            _ if status.is_server_error() => {
                error!("request failed: {}", self);
                "An unexpected error occurred".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(status).json(json!({
            "success": false,
            "message": message
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidSignature => StatusCode::FORBIDDEN,
                AuthError::TokenExpired => StatusCode::FORBIDDEN,
                AuthError::MalformedToken => StatusCode::FORBIDDEN,
                AuthError::Forbidden => StatusCode::FORBIDDEN,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUsername => StatusCode::BAD_REQUEST,
            AppError::Database(DatabaseError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Internal(_)));

        let config_err = config::ConfigError::NotFound(String::from("key not found"));
        let app_err: AppError = config_err.into();
        assert!(matches!(app_err, AppError::Config(_)));

        let db_err = sqlx::Error::RowNotFound;
        let app_err: AppError = db_err.into();
        assert!(matches!(app_err, AppError::Database(DatabaseError::NotFound)));
    }

    #[test]
    fn test_error_status_codes() {
        // Login failures are client errors on the original wire contract
        let err = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::Auth(AuthError::MissingToken);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = AppError::Auth(AuthError::TokenExpired);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = AppError::Auth(AuthError::InvalidSignature);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = AppError::Auth(AuthError::MalformedToken);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = AppError::Validation("invalid input".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::DuplicateUsername;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::Database(DatabaseError::QueryError("boom".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_token_failures_share_external_shape() {
        // Expired and tampered tokens must be indistinguishable to the caller
        let expired = AppError::Auth(AuthError::TokenExpired).error_response();
        let tampered = AppError::Auth(AuthError::InvalidSignature).error_response();
        let malformed = AppError::Auth(AuthError::MalformedToken).error_response();

        assert_eq!(expired.status(), tampered.status());
        assert_eq!(expired.status(), malformed.status());
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Validation("test error".to_string());
        assert_eq!(err.to_string(), "Validation error: test error");

        let err = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(
            err.to_string(),
            "Authentication error: Invalid username or password"
        );

        let err = AppError::DuplicateUsername;
        assert_eq!(err.to_string(), "Username is already taken");
    }
}
