// Defines a custom error type and a result type alias for the application using the thiserror crate.
use thiserror::Error;

// Make the response module public
pub mod response;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // The #[from] attribute automatically converts a bcrypt::BcryptError into an AppError::Hash using the From trait.
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("{0}")]
    Internal(String),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
