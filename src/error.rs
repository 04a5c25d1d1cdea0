use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by the practice API.
///
/// Corrupt log rows never show up here: the store readers drop them and keep
/// going (see [`crate::store::CorruptRecord`]).
#[derive(Debug, Error)]
pub enum PracticeError {
    /// An unknown difficulty, clef or similar enumerated value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An answer or export arrived for a token that holds no matching challenge.
    #[error("no active challenge for this session")]
    NoActiveChallenge,

    /// The session tracker was driven out of order, e.g. an answer while idle.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PracticeError>;

/// Structured error body handed back to the collaborator layer instead of a
/// partial success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl From<&PracticeError> for ErrorPayload {
    fn from(err: &PracticeError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_message() {
        let err = PracticeError::InvalidArgument("unknown difficulty 'expert'".into());
        let payload = ErrorPayload::from(&err);
        assert_eq!(
            payload.error,
            "invalid argument: unknown difficulty 'expert'"
        );
    }

    #[test]
    fn payload_serializes_as_error_object() {
        let payload = ErrorPayload::from(&PracticeError::NoActiveChallenge);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"error":"no active challenge for this session"}"#);
    }
}
