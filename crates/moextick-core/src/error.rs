use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation and contract errors exposed by `moextick-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("search query cannot be empty")]
    EmptyQuery,
    #[error("unknown instrument type '{value}', expected one of share, bond, fund")]
    UnknownInstrumentType { value: String },

    #[error("required field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error("invalid value '{value}' for configuration key {key}")]
    InvalidConfig { key: &'static str, value: String },
}

/// Error classification for client operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoexErrorKind {
    /// The instrument does not exist in ISS reference data.
    NotFound,
    /// HTTP status or transport failure talking to ISS.
    Upstream,
    /// ISS answered with a payload that does not have the tabular shape.
    Decode,
    Validation,
    /// The load task was aborted before producing a result.
    Cancelled,
    Internal,
}

/// Structured client error.
///
/// Cloneable so a single load outcome can be handed to every caller waiting on
/// the same cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoexError {
    kind: MoexErrorKind,
    message: String,
    retryable: bool,
}

impl MoexError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: MoexErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn upstream(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind: MoexErrorKind::Upstream,
            message: message.into(),
            retryable,
        }
    }

    pub fn upstream_status(status: u16, path: &str) -> Self {
        Self::upstream(
            format!("ISS returned status {status} for {path}"),
            matches!(status, 408 | 429 | 500..=599),
        )
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: MoexErrorKind::Decode,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self {
            kind: MoexErrorKind::Cancelled,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: MoexErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> MoexErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            MoexErrorKind::NotFound => "moex.not_found",
            MoexErrorKind::Upstream => "moex.upstream",
            MoexErrorKind::Decode => "moex.decode",
            MoexErrorKind::Validation => "moex.validation",
            MoexErrorKind::Cancelled => "moex.cancelled",
            MoexErrorKind::Internal => "moex.internal",
        }
    }
}

impl Display for MoexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for MoexError {}

impl From<ValidationError> for MoexError {
    fn from(error: ValidationError) -> Self {
        Self {
            kind: MoexErrorKind::Validation,
            message: error.to_string(),
            retryable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_retryable_only_for_transient_codes() {
        assert!(MoexError::upstream_status(503, "/securities.json").retryable());
        assert!(MoexError::upstream_status(429, "/securities.json").retryable());
        assert!(!MoexError::upstream_status(404, "/securities.json").retryable());
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let error = MoexError::from(ValidationError::UnknownInstrumentType {
            value: String::from("stock"),
        });

        assert_eq!(error.kind(), MoexErrorKind::Validation);
        assert_eq!(error.code(), "moex.validation");
        assert!(error.message().contains("stock"));
    }
}
