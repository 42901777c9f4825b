//! Error types for World Explorer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure talking to the country API.
    #[error("Failed to call country API: {0}")]
    Http(#[from] reqwest::Error),

    /// The country API answered with a non-success status.
    #[error("Country API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid API response: {0}")]
    Decode(String),

    #[error("Country not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Favorites document could not be read or written.
    #[error("Favorites store error: {0}")]
    Store(String),

    #[error("Invalid user name: {0:?}")]
    InvalidUser(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
