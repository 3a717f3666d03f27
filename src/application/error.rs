use axum::http::StatusCode;
use thiserror::Error;

/// Engine-wide error taxonomy. Rejections happen before any write; an
/// `Internal` failure is safe to retry because the operation either did not
/// commit or is idempotent.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn slot_taken() -> Self {
        EngineError::Conflict("slot already taken for the requested time range".to_string())
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
