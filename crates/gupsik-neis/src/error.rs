//! NEIS-specific error types.

use gupsik_core::NetworkError;
use thiserror::Error;

/// Failure string for transport errors and unparseable payloads.
pub const TRANSPORT_ERROR_MESSAGE: &str = "transport/parse error";

/// Failure string when a parseable payload lacks its data container.
pub const NO_DATA_MESSAGE: &str = "no data";

#[derive(Error, Debug)]
pub enum NeisError {
    #[error("Transport error: {0}")]
    Transport(#[from] NetworkError),

    #[error("Payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The service's own `RESULT` object reported a non-success code.
    /// Covers both real errors and the "no data" informational code.
    #[error("NEIS returned {code}: {message}")]
    Remote { code: String, message: String },

    #[error("Payload has no {0} container")]
    MissingContainer(&'static str),

    /// The container broke the `[header, body]` contract.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Invalid date {0:?}: expected 8 digits (YYYYMMDD)")]
    InvalidDate(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl NeisError {
    /// Message carried by the uniform `Outcome::Failure`.
    ///
    /// Remote messages pass through verbatim; the rest collapse to fixed strings.
    pub fn outcome_message(&self) -> String {
        match self {
            Self::Remote { message, .. } => message.clone(),
            Self::MissingContainer(_) => NO_DATA_MESSAGE.to_string(),
            Self::Transport(_) | Self::Parse(_) | Self::MalformedEnvelope(_) => {
                TRANSPORT_ERROR_MESSAGE.to_string()
            }
            Self::InvalidDate(_) | Self::InvalidUrl(_) => self.to_string(),
        }
    }

    /// Raw `RESULT.CODE` when the service itself reported the failure.
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Self::Remote { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_passes_through() {
        let err = NeisError::Remote {
            code: "INFO-200".into(),
            message: "해당하는 데이터가 없습니다.".into(),
        };
        assert_eq!(err.outcome_message(), "해당하는 데이터가 없습니다.");
        assert_eq!(err.remote_code(), Some("INFO-200"));
    }

    #[test]
    fn test_shape_and_transport_messages_are_fixed() {
        assert_eq!(
            NeisError::MissingContainer("schoolInfo").outcome_message(),
            NO_DATA_MESSAGE
        );
        assert_eq!(
            NeisError::MalformedEnvelope("no body".into()).outcome_message(),
            TRANSPORT_ERROR_MESSAGE
        );
        assert_eq!(
            NeisError::Transport(NetworkError::Timeout).outcome_message(),
            TRANSPORT_ERROR_MESSAGE
        );
        assert!(NeisError::Transport(NetworkError::Timeout).remote_code().is_none());
    }

    #[test]
    fn test_invalid_date_message_names_the_input() {
        let err = NeisError::InvalidDate("2024-1-1".into());
        assert!(err.outcome_message().contains("2024-1-1"));
    }
}
