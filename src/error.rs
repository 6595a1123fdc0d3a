//! Error types shared across the application
//!
//! `ApiError` and `StorageError` travel inside iced messages, so they are
//! `Clone` and carry rendered strings rather than the source errors.
use thiserror::Error;

/// Failures while talking to the GraphQL endpoint or downloading avatars
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure
    #[error("http request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status and no usable body
    #[error("server responded with status {status}")]
    Status { status: u16 },

    /// The response carried a GraphQL `errors` array and no data
    #[error("graphql error: {0}")]
    GraphQl(String),

    /// The body was not the JSON shape we asked for
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::Status {
                status: status.as_u16(),
            },
            None => ApiError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Failures of the local key-value store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// SQLite (or the fake backend) rejected the operation
    #[error("storage backend failed: {0}")]
    Backend(String),

    /// The persisted snapshot could not be decoded
    #[error("persisted snapshot is corrupt: {0}")]
    Corrupt(String),

    /// The blocking worker panicked or was cancelled
    #[error("background task failed: {0}")]
    Join(String),

    /// Creating the data directory failed
    #[error("could not prepare {path}: {reason}")]
    Io { path: String, reason: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Join(err.to_string())
    }
}

/// Invalid or unresolvable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a data directory; pass --data-dir")]
    NoDataDir,
}

/// Everything that can stop the application from starting
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to install log subscriber: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("ui runtime failed: {0}")]
    Ui(#[from] iced::Error),
}
