//! Fault types at the fetch and configuration boundaries.
//!
//! Fetch failures never escape as panics: they are turned into a message and
//! stored as view-local error state. Referential misses (an id that is not in
//! the loaded data) are not errors at all and have no variant here.

use hub_types::PayloadError;
use thiserror::Error;

/// Failure of a request to the events/auth API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Network unreachable, CORS, DNS...
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response. `message` is the server's `error` field when it
    /// sent one, otherwise `HTTP {status}`.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Response body was not the expected shape.
    #[error("Unexpected response: {0}")]
    Payload(String),

    /// The request was aborted because its owner went away or was superseded.
    #[error("Request aborted")]
    Aborted,
}

impl FetchError {
    /// Build a status error, preferring the server's own message.
    pub fn status(status: u16, server_message: Option<String>) -> Self {
        let message = server_message.unwrap_or_else(|| format!("HTTP {status}"));
        FetchError::Status { status, message }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }

    /// 401/403 - the stored token is no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Status { status: 401 | 403, .. })
    }
}

impl From<PayloadError> for FetchError {
    fn from(err: PayloadError) -> Self {
        FetchError::Payload(err.to_string())
    }
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_prefers_server_message() {
        let err = FetchError::status(400, Some("Name is required".into()));
        assert_eq!(err.to_string(), "Name is required");

        let err = FetchError::status(502, None);
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn unauthorized_statuses() {
        assert!(FetchError::status(401, None).is_unauthorized());
        assert!(FetchError::status(403, None).is_unauthorized());
        assert!(!FetchError::status(500, None).is_unauthorized());
        assert!(!FetchError::Aborted.is_unauthorized());
    }

    #[test]
    fn payload_error_converts() {
        let err: FetchError = PayloadError::NotAnArray("null").into();
        assert!(matches!(err, FetchError::Payload(_)));
        assert!(err.to_string().contains("JSON array"));
    }
}
