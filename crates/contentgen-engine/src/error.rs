use contentgen_contracts::{SessionError, ValidationErrors, GENERIC_FAILURE_MESSAGE};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx reply. `message` is the server's `detail` or the generic fallback.
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Session(#[from] SessionError),
}

impl GenerationError {
    pub fn request(status: u16, detail: Option<String>) -> Self {
        GenerationError::Request {
            status,
            message: detail.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "validation",
            GenerationError::Network(_) => "network",
            GenerationError::Request { .. } => "request",
            GenerationError::InvalidResponse(_) => "invalid_response",
            GenerationError::Session(_) => "session",
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Network(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("There is no image to download")]
    NoImage,

    #[error("Image '{0}' is not a downloadable http(s) address")]
    NotDownloadable(String),

    #[error("Image download failed: {0}")]
    Network(String),

    #[error("Image download failed ({status})")]
    Status { status: u16 },

    #[error("Could not save image to {path}: {message}")]
    Save { path: String, message: String },
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        DownloadError::Network(err.to_string())
    }
}

#[derive(Debug, Error)]
#[error("Could not copy to clipboard: {0}")]
pub struct ClipboardError(pub String);
