//! Error types for the IoT monitor service

/// Errors that can occur in the IoT monitor service
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Broker error: {0}")]
    Broker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for IoT monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;
