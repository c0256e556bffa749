//! Error handling for the motion pipeline

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error (settings file, endpoints)
    #[error("Config error: {0}")]
    Config(String),

    /// Recorder error (capture or media persistence)
    #[error("Recorder error: {0}")]
    Recorder(String),

    /// Label detection backend error
    #[error("Detection error: {0}")]
    Detection(String),

    /// Messaging channel error
    #[error("Messaging error: {0}")]
    Messaging(String),

    /// Push channel error
    #[error("Push error: {0}")]
    Push(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
