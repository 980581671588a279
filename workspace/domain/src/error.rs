use sea_orm::TransactionError;
use thiserror::Error;

/// Error types for the domain module
#[derive(Error, Debug)]
pub enum DomainError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The requested username is already taken by another account
    #[error("username '{0}' is already in use")]
    DuplicateUsername(String),

    /// The requested email is already taken by another member
    #[error("email '{0}' is already in use")]
    DuplicateEmail(String),

    /// A fee for this member and year already exists
    #[error("member {member_id} already has a fee for year {year}")]
    DuplicateFeeYear { member_id: i32, year: i32 },

    /// The calling account lacks the required role
    #[error("operation requires administrator privileges")]
    Forbidden,

    /// A referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Login failed; deliberately does not say whether the username exists
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A field value failed validation before reaching the database
    #[error("validation error: {0}")]
    Validation(String),

    /// Error from password hashing or verification
    #[error("password hash error: {0}")]
    PasswordHash(String),
}

impl From<TransactionError<DomainError>> for DomainError {
    fn from(err: TransactionError<DomainError>) -> Self {
        match err {
            TransactionError::Connection(e) => DomainError::Database(e),
            TransactionError::Transaction(e) => e,
        }
    }
}

/// Type alias for Result with DomainError
pub type Result<T> = std::result::Result<T, DomainError>;
