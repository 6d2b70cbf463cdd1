//! Error types for the API client

use pricemonitor_core::ErrorCode;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused, connect timeout or I/O failure mid-read
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// The overall request deadline expired
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Response body is not the expected JSON document
    #[error("{0}")]
    Parse(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing a downloaded file failed
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// How a failure is presented to the cashier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server could not be reached or did not answer in time
    Network,
    /// The server answered with something unreadable
    Parse,
}

impl ApiError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Presentation category of this error
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Parse(_) => FailureKind::Parse,
            Self::Network(_)
            | Self::Timeout(_)
            | Self::Status { .. }
            | Self::InvalidUrl(_)
            | Self::Config(_)
            | Self::Io(_) => FailureKind::Network,
        }
    }

    /// Error code the failure is reported under
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            _ if self.is_timeout() => ErrorCode::Timeout,
            Self::Parse(_) => ErrorCode::ParseError,
            Self::InvalidUrl(_) | Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Network(_) | Self::Timeout(_) | Self::Status { .. } => ErrorCode::NetworkError,
        }
    }

    /// Check if this error came from the connect phase or a deadline
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout(),
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ApiError::parse("bad").kind(), FailureKind::Parse);
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(15)).kind(),
            FailureKind::Network
        );
        assert_eq!(
            ApiError::Status {
                status: 500,
                message: "boom".to_string()
            }
            .kind(),
            FailureKind::Network
        );
    }

    #[test]
    fn test_json_error_is_parse() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), FailureKind::Parse);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::parse("bad").code(), ErrorCode::ParseError);
        assert_eq!(ApiError::Timeout(Duration::from_secs(1)).code(), ErrorCode::Timeout);
        assert_eq!(ApiError::config("no host").code(), ErrorCode::ConfigError);
        assert_eq!(
            ApiError::Status {
                status: 502,
                message: "bad gateway".to_string()
            }
            .code(),
            ErrorCode::NetworkError
        );
        assert_eq!(ApiError::Timeout(Duration::from_secs(1)).code().exit_code(), 124);
        assert_eq!(ApiError::parse("bad").code().exit_code(), 4);
    }

    #[test]
    fn test_timeout_display() {
        let err = ApiError::Timeout(Duration::from_secs(3));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Request timeout after 3s");
    }
}
