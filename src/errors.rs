// errors.rs
use crate::domain::validation::ValidationErrors;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, auth, lead rules) or downstream layers (DB, exports).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The caller's `updatedAt` no longer matches the stored record.
    #[error("Record changed, please refresh")]
    Conflict,

    #[error("Too many requests. Please try again later.")]
    TooManyRequests,

    #[error("Database Error: {0}")]
    DbError(String),

    #[error("Spreadsheet Error: {0}")]
    XlsxError(String),

    #[error("CSV Error: {0}")]
    CsvError(String),

    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::Forbidden => 403,
            ServerError::Validation(_) => 422,
            ServerError::Conflict => 409,
            ServerError::TooManyRequests => 429,
            ServerError::DbError(_)
            | ServerError::XlsxError(_)
            | ServerError::CsvError(_)
            | ServerError::InternalError => 500,
        }
    }
}

impl From<rusqlite::Error> for ServerError {
    fn from(err: rusqlite::Error) -> Self {
        ServerError::DbError(err.to_string())
    }
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        ServerError::Validation(errors)
    }
}

impl From<csv::Error> for ServerError {
    fn from(err: csv::Error) -> Self {
        ServerError::CsvError(err.to_string())
    }
}
