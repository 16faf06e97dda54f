use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connection, timeout, body read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status or `success: false`
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
        details: Vec<String>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
