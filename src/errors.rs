use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::ApiResponse;

/// Failure of a ledger, catalog or account operation.
///
/// Client-facing variants carry the exact message returned in the envelope.
/// The remaining variants are logged in full and answered with a generic 5xx.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store failure: {0}")]
    DatabaseError(#[from] DbErr),

    /// A referenced product, supplier, transaction, category or user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A reference the operation cannot proceed without was not supplied.
    #[error("{0}")]
    MissingReference(String),

    #[error("{0}")]
    ValidationError(String),

    /// Login secret did not match. Reported as a 400, not a 401.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InsufficientStock(String),

    /// The movement would push stock past what the column can hold.
    #[error("{0}")]
    StockLimitExceeded(String),

    #[error("password hashing failed: {0}")]
    HashError(String),

    #[error("token signing failed: {0}")]
    JwtError(String),

    #[error("{0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(format!("Validation failed: {errors}"))
    }
}

impl ServiceError {
    /// `"<what> Not Found"`, the wording every lookup miss uses.
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{what} Not Found"))
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::HashError(_) | Self::JwtError(_) | Self::InternalError(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            _ if self.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InsufficientStock(_) | Self::StockLimitExceeded(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Text placed in the envelope's `message`. Internal causes stay in the logs.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_owned(),
            _ if self.is_internal() => "Internal server error".to_owned(),
            client_facing => client_facing.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_internal() {
            error!(error = %self, status = status.as_u16(), "request failed");
        }
        (status, Json(ApiResponse::failure(status, self.response_message()))).into_response()
    }
}
