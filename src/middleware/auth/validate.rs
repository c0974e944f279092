//! Token validation seam.
//!
//! The middleware never verifies tokens itself. Signature checks, key
//! lookup and claim policy all live behind [`ValidateToken`].

use std::{future::Future, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::error::BoxError;

#[async_trait]
pub trait ValidateToken: Send + Sync + 'static {
    /// Decoded payload handed to downstream handlers.
    type Claims: Clone + Send + Sync + 'static;

    /// `parts` is the head of the in-flight request; validators that need
    /// request-scoped values (extensions, headers) read them from there.
    async fn validate_token(&self, parts: &Parts, token: &str) -> Result<Self::Claims, BoxError>;
}

/// Adapts an async closure into a [`ValidateToken`].
///
/// ```ignore
/// let validator = validate_fn(|token: String| async move {
///     if token == "letmein" { Ok(token) } else { Err("nope".into()) }
/// });
/// ```
pub fn validate_fn<F, Fut, C>(f: F) -> ValidateFn<F, C>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, BoxError>> + Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    ValidateFn {
        f,
        _claims: PhantomData,
    }
}

pub struct ValidateFn<F, C> {
    f: F,
    _claims: PhantomData<fn() -> C>,
}

#[async_trait]
impl<F, Fut, C> ValidateToken for ValidateFn<F, C>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, BoxError>> + Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    type Claims = C;

    async fn validate_token(&self, _parts: &Parts, token: &str) -> Result<C, BoxError> {
        (self.f)(token.to_string()).await
    }
}

/// Lets one validator back several middlewares (e.g. required and optional
/// route groups).
#[async_trait]
impl<V: ValidateToken> ValidateToken for Arc<V> {
    type Claims = V::Claims;

    async fn validate_token(&self, parts: &Parts, token: &str) -> Result<V::Claims, BoxError> {
        (**self).validate_token(parts, token).await
    }
}
