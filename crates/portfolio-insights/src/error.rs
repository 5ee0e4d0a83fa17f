//! Error Types for Portfolio Insights
//!
//! Only the normalization boundary can fail. Rules, scorers and the timeline
//! operate on an already normalized snapshot and are infallible.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Payload does not match the expected shape (wrong types, missing required fields)
    #[error("Invalid portfolio payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// Payload is well-formed but a field violates a snapshot rule
    #[error("Invalid field `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// `mined_at` was neither epoch millis nor a parseable date string
    #[error("Invalid timestamp in `{field}`: {value}")]
    InvalidTimestamp { field: String, value: String },
}

impl AdvisorError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure happened at the normalization boundary.
    ///
    /// Every current variant does; callers use this to map the error to a
    /// client error rather than a server fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPayload(_) | Self::Validation { .. } | Self::InvalidTimestamp { .. }
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "INVALID_PORTFOLIO",
            Self::Validation { .. } => "INVALID_FIELD",
            Self::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidPayload(_) => "The portfolio data could not be read.".into(),
            Self::Validation { field, reason } => format!("Portfolio field '{field}' is invalid: {reason}"),
            Self::InvalidTimestamp { field, .. } => {
                format!("Portfolio field '{field}' is not a valid timestamp.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AdvisorError::validation("tokens[0].value", "must not be negative");
        assert!(err.is_validation());
        assert_eq!(err.code(), "INVALID_FIELD");
        assert!(err.user_message().contains("tokens[0].value"));

        let err: AdvisorError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert_eq!(err.code(), "INVALID_PORTFOLIO");
    }
}
