//! HTTP boundary for the error taxonomy.
//!
//! Every internal failure is converted to a structured JSON body with exactly
//! one status code per taxonomy entry. Internal details are logged, never
//! serialized; token failures all render the same opaque message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relaycast_common::Error;
use relaycast_token::TokenError;
use serde::Serialize;

/// Wrapper implementing `IntoResponse` for the common error type.
#[derive(Debug)]
pub struct ApiError(pub Error);

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::InvalidToken => (StatusCode::BAD_REQUEST, "invalid_token"),
            Error::RangeNotSatisfiable(_) => {
                (StatusCode::RANGE_NOT_SATISFIABLE, "range_not_satisfiable")
            }
            Error::UpstreamUnavailable(_) => (StatusCode::BAD_GATEWAY, "upstream_unavailable"),
            Error::UpstreamTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout"),
            Error::Io(_) | Error::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        // Full detail goes to the log; the body only carries what the client
        // is entitled to see.
        let message = match &self.0 {
            Error::Io(e) => {
                tracing::error!("internal I/O error: {e}");
                "internal error".to_string()
            }
            Error::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                "internal error".to_string()
            }
            err => {
                tracing::warn!("request failed ({kind}): {err}");
                err.to_string()
            }
        };

        (status, Json(ErrorBody { error: kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        // The discriminant is diagnostic-only; clients get one opaque kind.
        tracing::debug!("token rejected: {err:?}");
        Self(Error::InvalidToken)
    }
}
