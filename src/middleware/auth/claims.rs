//! Validated claims carried from the middleware to handlers.
//!
//! The middleware stores claims in request extensions under [`ContextKey`],
//! which is private to this crate. Handlers read them back with
//! [`Claims`] (required) or `Option<Claims<C>>` (credentials-optional routes).

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{Extensions, StatusCode, request::Parts};

#[derive(Clone)]
pub(crate) struct ContextKey<C>(pub(crate) C);

pub(crate) fn insert_claims<C>(extensions: &mut Extensions, claims: C)
where
    C: Clone + Send + Sync + 'static,
{
    extensions.insert(ContextKey(claims));
}

/// Claims attached by the JWT middleware, if any.
pub fn claims_from_extensions<C>(extensions: &Extensions) -> Option<&C>
where
    C: Clone + Send + Sync + 'static,
{
    extensions.get::<ContextKey<C>>().map(|key| &key.0)
}

/// Handler extractor for the claims placed by the middleware.
///
/// Rejects with 401 when nothing was attached (route not behind the
/// middleware, or credentials were optional and absent).
#[derive(Debug, Clone)]
pub struct Claims<C>(pub C);

impl<S, C> FromRequestParts<S> for Claims<C>
where
    S: Send + Sync,
    C: Clone + Send + Sync + 'static,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claims_from_extensions::<C>(&parts.extensions)
            .cloned()
            .map(Claims)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

impl<S, C> OptionalFromRequestParts<S> for Claims<C>
where
    S: Send + Sync,
    C: Clone + Send + Sync + 'static,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(claims_from_extensions::<C>(&parts.extensions)
            .cloned()
            .map(Claims))
    }
}
