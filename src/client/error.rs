//! Errors from the task-serving API.

use thiserror::Error;

/// Failure of a single request to the task API.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Connection failed, timed out, or was reset
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// HTTP status code, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is transient and the request should be retried.
    ///
    /// A body that does not parse will not parse on the next attempt either.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Parse(_))
    }

    /// Response body, if the server answered with one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            Self::Network(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(format!("Request failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_context() {
        let err = ClientError::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.body(), Some("overloaded"));
        assert_eq!(err.to_string(), "HTTP 503: overloaded");

        let err = ClientError::Network("Connection failed".to_string());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.body(), None);
    }

    #[test]
    fn test_parse_errors_are_not_transient() {
        assert!(ClientError::Network("reset".to_string()).is_transient());
        assert!(ClientError::Status {
            status: 500,
            body: String::new(),
        }
        .is_transient());
        assert!(!ClientError::Parse("missing batch".to_string()).is_transient());
    }
}
