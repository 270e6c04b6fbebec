// Error types for the quickstart console.
// Covers transport failures, backend rejections, config and local IO errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the data hub service.
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl HubError {
    /// Text shown to the user inside a dialog.
    /// Service rejections surface the backend's own message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            HubError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Status code and payload for alert-style reporting.
    /// Transport-level failures have no status and report 0.
    pub fn status_and_payload(&self) -> (u16, String) {
        match self {
            HubError::Service { status, message } => (*status, message.clone()),
            HubError::NotFound(url) => (404, url.clone()),
            HubError::Http(e) => (e.status().map(|s| s.as_u16()).unwrap_or(0), e.to_string()),
            other => (0, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, HubError>;
