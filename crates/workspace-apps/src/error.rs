//! Error types for workspace-apps

/// Errors raised by directory collaborators.
///
/// The provider itself never surfaces these to callers; they are logged and
/// the affected step degrades to "no data" or "not granted".
#[derive(Debug, thiserror::Error)]
pub enum AppsError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Invalid endpoint definition: {0}")]
    InvalidEndpoint(String),

    #[error("Permission query failed: {0}")]
    Permission(String),

    #[error("Lifecycle notification failed: {0}")]
    Notify(String),
}
