use axum::http::StatusCode;
use thiserror::Error;

pub type VoteboardResult<T> = Result<T, VoteboardError>;

#[derive(Debug, Error)]
pub enum VoteboardError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("validation failed for {field}: {message}")]
    Validation { field: String, message: String },
    #[error("feature not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl VoteboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VoteboardError::Configuration(_) => StatusCode::BAD_REQUEST,
            VoteboardError::Validation { .. } => StatusCode::BAD_REQUEST,
            VoteboardError::NotFound(_) => StatusCode::NOT_FOUND,
            VoteboardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            VoteboardError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            VoteboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
