use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nutrilens_core::domain::food_analysis::errors::{
    AnalysisError, AnalysisErrorKind, NetworkError,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Analysis {
        status: StatusCode,
        kind: AnalysisErrorKind,
        message: String,
    },
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub code: u16,
    /// Present when the failure came from the analysis pipeline.
    pub kind: Option<AnalysisErrorKind>,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Analysis { status, .. } => *status,
        }
    }
}

pub fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::Input => StatusCode::BAD_REQUEST,
        AnalysisError::Encoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Network(NetworkError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        AnalysisError::Network(_)
        | AnalysisError::Api { .. }
        | AnalysisError::MalformedResponse(_)
        | AnalysisError::Decoding(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AnalysisError> for ApiError {
    fn from(error: AnalysisError) -> Self {
        let status = status_for(&error);
        if status.is_server_error() {
            tracing::error!("Food analysis failed: {}", error);
        } else {
            tracing::warn!("Food analysis rejected: {}", error);
        }

        ApiError::Analysis {
            status,
            kind: error.kind(),
            message: error.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = match &self {
            ApiError::Analysis { kind, .. } => Some(*kind),
            ApiError::BadRequest(_) => None,
        };

        let body = ApiErrorResponse {
            code: status.as_u16(),
            kind,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use nutrilens_core::domain::food_analysis::errors::{DecodingError, DecodingErrorKind};

    use super::*;

    #[test]
    fn test_status_follows_error_kind() {
        let cases = [
            (AnalysisError::Input, StatusCode::BAD_REQUEST),
            (AnalysisError::Encoding("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AnalysisError::Network(NetworkError::Timeout), StatusCode::GATEWAY_TIMEOUT),
            (
                AnalysisError::Network(NetworkError::Transport("reset".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AnalysisError::MalformedResponse("no candidates".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AnalysisError::Decoding(DecodingError::new(
                    DecodingErrorKind::KeyNotFound,
                    "calories",
                    "missing",
                )),
                StatusCode::BAD_GATEWAY,
            ),
            (AnalysisError::Configuration("no key".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }

    #[test]
    fn test_analysis_error_keeps_kind_and_user_message() {
        let error = AnalysisError::Api {
            code: Some(403),
            status: Some("PERMISSION_DENIED".into()),
            message: "bad key".into(),
        };
        let expected = error.user_message();

        match ApiError::from(error) {
            ApiError::Analysis { kind, message, .. } => {
                assert_eq!(kind, AnalysisErrorKind::Api);
                assert_eq!(message, expected);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_request_has_no_analysis_kind() {
        let error = ApiError::BadRequest("Missing image field".into());

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "Missing image field");
    }
}
