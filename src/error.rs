/*
 * Responsibility
 * - JwtError: failures produced while checking a request's JWT
 * - ErrorKind: missing / invalid / other classification used by error handlers
 * - IntoResponse (HTTP status / JSON error body), which is the default classification
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Boxed error returned by extractors and validators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of a [`JwtError`].
///
/// Error handlers should branch on this rather than on the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No token was present and credentials are required.
    Missing,
    /// A token was present but the validator rejected it.
    Invalid,
    /// Anything else (extractor faults, integrator-defined failures).
    Other,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("jwt missing")]
    Missing,

    /// Validator rejection. The cause is kept intact for callers that want
    /// to inspect the validator's own error.
    #[error("jwt invalid: {0}")]
    Invalid(#[source] BoxError),

    /// The extractor faulted. This is not "missing": the credential may well
    /// be there, we just could not read it.
    #[error("error extracting token: {0}")]
    Extraction(#[source] BoxError),

    #[error("{0}")]
    Other(#[source] BoxError),
}

impl JwtError {
    pub fn invalid(cause: impl Into<BoxError>) -> Self {
        Self::Invalid(cause.into())
    }

    pub fn extraction(cause: impl Into<BoxError>) -> Self {
        Self::Extraction(cause.into())
    }

    pub fn other(cause: impl Into<BoxError>) -> Self {
        Self::Other(cause.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            JwtError::Missing => ErrorKind::Missing,
            JwtError::Invalid(_) => ErrorKind::Invalid,
            JwtError::Extraction(_) | JwtError::Other(_) => ErrorKind::Other,
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    /// Wrapped cause, if any. `Missing` has none.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            JwtError::Missing => None,
            JwtError::Invalid(e) | JwtError::Extraction(e) | JwtError::Other(e) => Some(e.as_ref()),
        }
    }

    /// Downcast the wrapped cause to a concrete error type.
    pub fn downcast_cause<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.cause().and_then(|e| e.downcast_ref::<E>())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: &'static str,
}

impl ErrorKind {
    fn status_and_message(self) -> (StatusCode, &'static str) {
        match self {
            ErrorKind::Missing => (StatusCode::BAD_REQUEST, "JWT is missing."),
            ErrorKind::Invalid => (StatusCode::UNAUTHORIZED, "JWT is invalid."),
            ErrorKind::Other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong while checking the JWT.",
            ),
        }
    }
}

impl IntoResponse for JwtError {
    fn into_response(self) -> Response {
        // The body never carries the cause.
        let (status, message) = self.kind().status_and_message();
        (status, Json(ErrorResponse { message })).into_response()
    }
}
