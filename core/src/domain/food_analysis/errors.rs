use std::fmt;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Coarse classification of an [`AnalysisError`], suitable for display and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisErrorKind {
    Input,
    Configuration,
    Encoding,
    Network,
    Api,
    MalformedResponse,
    Decoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid response envelope: {0}")]
    InvalidEnvelope(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecodingErrorKind {
    KeyNotFound,
    TypeMismatch,
    ValueNotFound,
    DataCorrupted,
}

impl fmt::Display for DecodingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecodingErrorKind::KeyNotFound => "key not found",
            DecodingErrorKind::TypeMismatch => "type mismatch",
            DecodingErrorKind::ValueNotFound => "value not found",
            DecodingErrorKind::DataCorrupted => "data corrupted",
        };
        write!(f, "{}", s)
    }
}

/// Failure to turn the model's text payload into an analysis result.
///
/// `path` uses dotted/indexed notation (`macros[1].amount`); an empty path
/// refers to the payload root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at `{path}`: {reason}")]
pub struct DecodingError {
    pub kind: DecodingErrorKind,
    pub path: String,
    pub reason: String,
}

impl DecodingError {
    pub fn new(kind: DecodingErrorKind, path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no image to analyze")]
    Input,

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("image encoding failed: {0}")]
    Encoding(String),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("api error{}: {message}", display_code(.code, .status))]
    Api {
        code: Option<i64>,
        status: Option<String>,
        message: String,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("decoding failed: {0}")]
    Decoding(#[from] DecodingError),
}

fn display_code(code: &Option<i64>, status: &Option<String>) -> String {
    match (code, status) {
        (Some(code), Some(status)) => format!(" ({} {})", code, status),
        (Some(code), None) => format!(" ({})", code),
        (None, Some(status)) => format!(" ({})", status),
        (None, None) => String::new(),
    }
}

impl AnalysisError {
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::Input => AnalysisErrorKind::Input,
            AnalysisError::Configuration(_) => AnalysisErrorKind::Configuration,
            AnalysisError::Encoding(_) => AnalysisErrorKind::Encoding,
            AnalysisError::Network(_) => AnalysisErrorKind::Network,
            AnalysisError::Api { .. } => AnalysisErrorKind::Api,
            AnalysisError::MalformedResponse(_) => AnalysisErrorKind::MalformedResponse,
            AnalysisError::Decoding(_) => AnalysisErrorKind::Decoding,
        }
    }

    /// Short message meant for end users. Status codes and field paths stay in
    /// the `Display` output for logs.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Input => "Select a photo before starting the analysis.".to_string(),
            AnalysisError::Configuration(_) => {
                "The analysis service is not configured correctly.".to_string()
            }
            AnalysisError::Encoding(_) => "The photo could not be prepared for upload.".to_string(),
            AnalysisError::Network(NetworkError::Timeout) => {
                "The analysis took too long. Please try again.".to_string()
            }
            AnalysisError::Network(_) => {
                "Could not reach the analysis service. Check your connection.".to_string()
            }
            AnalysisError::Api { message, .. } => {
                format!("The analysis service rejected the request: {}", message)
            }
            AnalysisError::MalformedResponse(_) => {
                "The analysis service returned an incomplete response.".to_string()
            }
            AnalysisError::Decoding(_) => "The nutrition data could not be read.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_keeps_diagnostics() {
        let error = AnalysisError::Api {
            code: Some(403),
            status: Some("PERMISSION_DENIED".to_string()),
            message: "bad key".to_string(),
        };

        assert_eq!(error.to_string(), "api error (403 PERMISSION_DENIED): bad key");
        assert_eq!(error.kind(), AnalysisErrorKind::Api);
    }

    #[test]
    fn test_decoding_error_display_includes_path() {
        let error = AnalysisError::from(DecodingError::new(
            DecodingErrorKind::KeyNotFound,
            "calories",
            "key `calories` not found",
        ));

        assert_eq!(
            error.to_string(),
            "decoding failed: key not found at `calories`: key `calories` not found"
        );
        assert_eq!(error.user_message(), "The nutrition data could not be read.");
    }

    #[test]
    fn test_user_message_hides_transport_detail() {
        let error = AnalysisError::from(NetworkError::Transport(
            "error sending request for url".to_string(),
        ));

        assert_eq!(error.kind(), AnalysisErrorKind::Network);
        assert!(!error.user_message().contains("url"));
    }
}
