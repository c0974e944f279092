//! Transport layers wrapped around the whole router.
//!
//! Outermost first: error-to-status mapping, `x-request-id` set and echoed,
//! body limit, timeout, then the trace span.
//!
//! The JWT layer adds no timeout of its own; a slow validator is bounded
//! by the timeout here.

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wrap `router` in the transport layers, sized from `config`.
pub fn apply(router: Router, config: &Config) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = Duration::from_secs(config.request_timeout_seconds);

    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(timeout_to_status))
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}

async fn timeout_to_status(err: BoxError) -> StatusCode {
    if err.is::<Elapsed>() {
        tracing::warn!("request timed out");
        StatusCode::REQUEST_TIMEOUT
    } else {
        tracing::error!(error = %err, "unhandled service error");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
