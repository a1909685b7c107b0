//! Error types shared by the controllers.

use thiserror::Error;

/// Failure of a request against the bingo server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with an `{"error": ...}` payload
    #[error("{0}")]
    Application(String),

    /// Non-success status without an error message
    #[error("Server returned status {0}")]
    Status(u16),

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Failure of an admin action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// Rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The user declined a confirmation prompt
    #[error("Cancelled")]
    Cancelled,
}

impl AdminError {
    pub fn validation(message: impl Into<String>) -> Self {
        AdminError::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_displays_server_text() {
        let err = ApiError::Application("Drawing has not started".to_string());
        assert_eq!(err.to_string(), "Drawing has not started");
    }

    #[test]
    fn test_admin_error_from_api() {
        let err: AdminError = ApiError::Status(500).into();
        assert_eq!(err.to_string(), "Server returned status 500");
    }
}
