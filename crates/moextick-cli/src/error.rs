use moextick_core::{MoexError, MoexErrorKind, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lookup(#[from] MoexError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Lookup(error) => match error.kind() {
                MoexErrorKind::Validation => 2,
                MoexErrorKind::NotFound => 3,
                MoexErrorKind::Upstream | MoexErrorKind::Decode => 4,
                MoexErrorKind::Cancelled | MoexErrorKind::Internal => 1,
            },
            Self::Serialization(_) => 5,
            Self::Io(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_errors_map_to_distinct_exit_codes() {
        let not_found = CliError::from(MoexError::not_found("share NOPE not found"));
        let upstream = CliError::from(MoexError::upstream_status(503, "/securities.json"));
        let decode = CliError::from(MoexError::decode("bad table"));
        let internal = CliError::from(MoexError::internal("loader panicked"));
        let validation = CliError::from(MoexError::from(ValidationError::EmptyTicker));

        assert_eq!(not_found.exit_code(), 3);
        assert_eq!(upstream.exit_code(), 4);
        assert_eq!(decode.exit_code(), 4);
        assert_eq!(internal.exit_code(), 1);
        assert_eq!(validation.exit_code(), 2);
    }

    #[test]
    fn config_errors_are_validation_failures() {
        let error = CliError::from(ValidationError::InvalidConfig {
            key: "MOEX_TIMEOUT_MS",
            value: String::from("soon"),
        });

        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("MOEX_TIMEOUT_MS"));
    }

    #[test]
    fn serialization_errors_exit_with_five() {
        let error = serde_json::from_str::<u8>("nope").expect_err("invalid json");
        assert_eq!(CliError::from(error).exit_code(), 5);
    }
}
