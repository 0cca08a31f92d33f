//! Error types for the analysis pipeline.
//!
//! Three kinds of failure are distinguished: CSV parsing problems,
//! failures of the external analysis call (including contract
//! violations in its response), and everything else.

use thiserror::Error;

/// Errors surfaced by the aggregation and analysis pipeline.
///
/// Messages are shown to the user verbatim, so they should be
/// actionable ("Could not find 'BA' or 'Business Area' column."),
/// not internal. Display carries the message alone, with no kind
/// prefix; the variant is for matching, not for the user.
#[derive(Debug, Error)]
pub enum InsightError {
    /// Malformed or empty CSV input, or a missing required column.
    #[error("{0}")]
    Parse(String),

    /// Missing credential, request failure, or a response that does
    /// not satisfy the output schema.
    #[error("{0}")]
    Analysis(String),

    /// Any other failure (e.g. file read errors).
    #[error("{0}")]
    Unexpected(String),
}

impl InsightError {
    /// The user-facing message as a borrowed str.
    pub fn message(&self) -> &str {
        match self {
            InsightError::Parse(msg)
            | InsightError::Analysis(msg)
            | InsightError::Unexpected(msg) => msg,
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_verbatim_message() {
        let err = InsightError::Parse("File is empty".to_string());
        assert_eq!(err.to_string(), "File is empty");

        let err = InsightError::Analysis("No response from model".to_string());
        assert_eq!(err.to_string(), "No response from model");
    }

    #[test]
    fn test_message_matches_display() {
        let err = InsightError::Analysis("timed out".to_string());
        assert_eq!(err.message(), "timed out");
        assert_eq!(err.message(), err.to_string());
    }
}
