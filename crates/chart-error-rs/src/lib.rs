use std::io;

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serde_json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid UTF-8 sequence: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("system error: {0}")]
    System(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The chart description failed shape validation before any I/O.
    #[error("invalid field '{field}': expected {expected}, got {got}")]
    Validation {
        field: String,
        expected: String,
        got: String,
    },

    /// The charting service could not be reached or refused the request.
    #[error("chart retrieval failed{}: {message}", fmt_status(.status))]
    Retrieval {
        status: Option<u16>,
        message: String,
    },

    /// The rendered image could not be written to disk.
    #[error("failed to save chart to '{path}': {source}")]
    Persistence { path: String, source: io::Error },
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl Error {
    pub fn validation(
        field: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Error::Validation {
            field: field.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn retrieval(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Retrieval {
            status,
            message: message.into(),
        }
    }

    pub fn persistence(path: impl Into<String>, source: io::Error) -> Self {
        Error::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Stable kind label for the chart domain errors, used by the tool
    /// surface to build its error payload.
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Error::Validation { .. } => Some("validation"),
            Error::Retrieval { .. } => Some("retrieval"),
            Error::Persistence { .. } => Some("persistence"),
            _ => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

pub type BoxError = Box<dyn std::error::Error + Sync + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field_and_shapes() {
        let err = Error::validation("type", "one of the supported chart types", "string \"foo\"");
        let msg = err.to_string();
        assert!(msg.contains("'type'"));
        assert!(msg.contains("supported chart types"));
        assert!(msg.contains("\"foo\""));
        assert_eq!(err.kind(), Some("validation"));
    }

    #[test]
    fn retrieval_message_includes_status_when_present() {
        let err = Error::retrieval(Some(503), "service unavailable");
        assert!(err.to_string().contains("HTTP 503"));
        assert_eq!(err.kind(), Some("retrieval"));

        let err = Error::retrieval(None, "connection timed out");
        assert!(!err.to_string().contains("HTTP"));
    }

    #[test]
    fn persistence_message_carries_path() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = Error::persistence("/tmp/chart.png", source);
        assert!(err.to_string().contains("/tmp/chart.png"));
        assert_eq!(err.kind(), Some("persistence"));
    }

    #[test]
    fn protocol_errors_have_no_domain_kind() {
        assert_eq!(Error::System("boom".into()).kind(), None);
    }
}
