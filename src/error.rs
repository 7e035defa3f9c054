/// Error types for social-core
use thiserror::Error;

/// Coarse error category for callers that only need to branch on the
/// class of failure (the wire layer maps these to status codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Conflict,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("You can't follow yourself")]
    SelfFollow,

    #[error("Follow already exists")]
    DuplicateFollow,

    #[error("You have already liked this post")]
    AlreadyLiked,

    #[error("Username already in use")]
    UsernameTaken,

    #[error("Email already in use")]
    EmailTaken,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Unauthorized | AppError::InvalidCredentials => ErrorKind::Auth,
            AppError::SelfFollow => ErrorKind::Validation,
            AppError::DuplicateFollow
            | AppError::AlreadyLiked
            | AppError::UsernameTaken
            | AppError::EmailTaken => ErrorKind::Conflict,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for all fallible operations in this crate
pub type Result<T> = std::result::Result<T, AppError>;
