//! Mapping of relay failures onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use extrelay_types::RelayError;
use serde::Serialize;

/// Result type for relay handlers.
pub type HandlerResult<T> = Result<T, ErrorResponse>;

/// A [`RelayError`] rendered as `{"response": <text>, "code": <CODE>}`.
#[derive(Debug)]
pub struct ErrorResponse(pub RelayError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    response: String,
    code: &'static str,
}

impl ErrorResponse {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RelayError::MalformedRequestBody { .. } => StatusCode::BAD_REQUEST,
            RelayError::UnknownFunction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::SeriesNotFound { .. }
            | RelayError::DataFetchFailed { .. }
            | RelayError::DispatchRejected { .. }
            | RelayError::WriteFailed { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<RelayError> for ErrorResponse {
    fn from(error: RelayError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            response: self.0.to_string(),
            code: self.0.code(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (RelayError::malformed_request_body("eof"), StatusCode::BAD_REQUEST),
            (RelayError::unknown_function("Nope"), StatusCode::UNPROCESSABLE_ENTITY),
            (RelayError::upstream_unavailable("http://x", "refused"), StatusCode::SERVICE_UNAVAILABLE),
            (RelayError::series_not_found("ts", 404), StatusCode::BAD_GATEWAY),
            (
                RelayError::data_fetch_failed("ts", RelayError::series_not_found("ts", 404)),
                StatusCode::BAD_GATEWAY,
            ),
            (RelayError::dispatch_rejected("ext", "route", 500), StatusCode::BAD_GATEWAY),
            (
                RelayError::write_failed("ts", RelayError::upstream_unavailable("http://x", "timeout")),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (error, expected) in cases {
            let response = ErrorResponse::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
