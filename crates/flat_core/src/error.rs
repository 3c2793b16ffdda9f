//! Client error types

use thiserror::Error;

/// Main client error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Backend errors (handled locally at the call site) =====
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Backend returned HTTP {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid input: {0}")]
    Validation(String),

    // ===== Fatal errors (abort the command) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
}

impl AppError {
    /// Build a status error from an HTTP code and an optional backend message
    pub fn status(status: u16, detail: Option<String>) -> Self {
        AppError::Status { status, detail }
    }

    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Transport(_)
                | AppError::Status { .. }
                | AppError::MalformedBody(_)
                | AppError::NotAuthenticated
                | AppError::Validation(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// HTTP status carried by the error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AppError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport(_) => "Cannot reach the FlatFly server".to_string(),
            AppError::Status { status: 401 | 403, .. } | AppError::NotAuthenticated => {
                "Please log in first".to_string()
            }
            AppError::Status { status: 404, .. } => "Not found".to_string(),
            AppError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            AppError::MalformedBody(_) => "Unexpected server response".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::MalformedBody(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = AppError::status(400, Some("Invalid link".to_string()));
        assert_eq!(err.to_string(), "Backend returned HTTP 400: Invalid link");
        assert_eq!(AppError::status(500, None).to_string(), "Backend returned HTTP 500");
    }

    #[test]
    fn test_user_message() {
        assert_eq!(AppError::status(401, None).user_message(), "Please log in first");
        assert_eq!(
            AppError::status(400, Some("Password required".to_string())).user_message(),
            "Password required"
        );
        assert!(AppError::Transport("refused".into()).is_recoverable());
        assert!(AppError::Config("bad".into()).is_fatal());
    }
}
