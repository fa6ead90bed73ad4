use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors returned by the request pipeline. They reach the caller unmodified:
/// the pipeline never retries and never swallows a failure.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The service has no base URL for the active environment. No request was sent.
    #[error("no base URL configured for service `{service}`")]
    Config { service: String },

    /// The request path contains a dot segment. No request was sent.
    #[error("request path `{path}` has a `.` or `..` segment")]
    InvalidPath { path: String },

    /// The HTTP exchange could not complete.
    #[error("transport error for {url}: {cause}")]
    Transport { url: String, cause: TransportCause },

    /// The response body was not valid JSON.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Request { status: u16, message: String },
}

#[derive(Error, Debug)]
pub enum TransportCause {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// HTTP status of a completed request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ClientError::Transport {
                cause: TransportCause::Timeout(_),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_display() {
        let err = ClientError::Request {
            status: 404,
            message: "not found".into(),
        };
        assert_eq!(err.to_string(), "request failed with status 404: not found");
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_timeout());
    }

    #[test]
    fn timeout_is_a_transport_error() {
        let err = ClientError::Transport {
            url: "http://127.0.0.1/health".into(),
            cause: TransportCause::Timeout(Duration::from_secs(2)),
        };
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
        assert_eq!(
            err.to_string(),
            "transport error for http://127.0.0.1/health: timed out after 2s"
        );
    }
}
