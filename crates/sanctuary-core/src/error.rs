//! Error types for Sanctuary

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A record or tool input failed construction-time checks
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// True for failures of the storage layer (connection, pool, SQL, file IO)
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Pool(_) | Error::Io(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
