//! JWT check: verify the token, then put the claims into request extensions.
//!
//! Per request:
//! 1. `OPTIONS` skips everything when `validate_on_options` is off.
//! 2. The extractor finds the token. An extractor error is reported as an
//!    internal failure, not as a missing token.
//! 3. An empty token passes through when credentials are optional, otherwise
//!    it is reported as missing.
//! 4. The validator decides. Its error is wrapped as invalid; its claims are
//!    attached to the request for downstream handlers.
//!
//! Every failure goes to the configured error handler and ends the request.

use std::{fmt, sync::Arc};

use axum::{
    Router,
    extract::{Request, State},
    http::{Method, request::Parts},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use super::claims::insert_claims;
use super::extract::{TokenExtractor, auth_header_token_extractor, token_extractor};
use super::validate::ValidateToken;
use crate::error::JwtError;

/// Builds the response for a failed check. The inner service is never
/// called after the handler runs, whatever it returns.
pub type ErrorHandler = Arc<dyn Fn(&Parts, JwtError) -> Response + Send + Sync>;

/// 400 for missing, 401 for invalid, 500 for everything else.
pub fn default_error_handler(_parts: &Parts, err: JwtError) -> Response {
    err.into_response()
}

/// Configuration mutators applied in order by [`JwtMiddleware::new`].
pub enum JwtOption {
    ErrorHandler(ErrorHandler),
    TokenExtractor(TokenExtractor),
    CredentialsOptional(bool),
    ValidateOnOptions(bool),
}

pub fn with_error_handler<F>(handler: F) -> JwtOption
where
    F: Fn(&Parts, JwtError) -> Response + Send + Sync + 'static,
{
    JwtOption::ErrorHandler(Arc::new(handler))
}

pub fn with_token_extractor(extractor: TokenExtractor) -> JwtOption {
    JwtOption::TokenExtractor(extractor)
}

pub fn with_credentials_optional(value: bool) -> JwtOption {
    JwtOption::CredentialsOptional(value)
}

pub fn with_validate_on_options(value: bool) -> JwtOption {
    JwtOption::ValidateOnOptions(value)
}

pub struct JwtMiddleware<V> {
    validator: V,
    error_handler: ErrorHandler,
    token_extractor: TokenExtractor,
    credentials_optional: bool,
    validate_on_options: bool,
}

impl<V> fmt::Debug for JwtMiddleware<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtMiddleware")
            .field("credentials_optional", &self.credentials_optional)
            .field("validate_on_options", &self.validate_on_options)
            .finish_non_exhaustive()
    }
}

impl<V: ValidateToken> JwtMiddleware<V> {
    pub fn new(validator: V, opts: impl IntoIterator<Item = JwtOption>) -> Self {
        let mut m = Self {
            validator,
            error_handler: Arc::new(default_error_handler),
            token_extractor: token_extractor(auth_header_token_extractor),
            credentials_optional: false,
            validate_on_options: true,
        };

        for opt in opts {
            match opt {
                JwtOption::ErrorHandler(h) => m.error_handler = h,
                JwtOption::TokenExtractor(e) => m.token_extractor = e,
                JwtOption::CredentialsOptional(v) => m.credentials_optional = v,
                JwtOption::ValidateOnOptions(v) => m.validate_on_options = v,
            }
        }

        m
    }

    pub fn credentials_optional(&self) -> bool {
        self.credentials_optional
    }

    pub fn validate_on_options(&self) -> bool {
        self.validate_on_options
    }

    /// Runs the decision procedure against a request head. On success the
    /// claims (if a token was validated) are already in `parts.extensions`.
    pub async fn authenticate(&self, parts: &mut Parts) -> Result<(), JwtError> {
        if !self.validate_on_options && parts.method == Method::OPTIONS {
            tracing::debug!("skipping jwt check for OPTIONS request");
            return Ok(());
        }

        let token = (self.token_extractor)(parts).map_err(JwtError::Extraction)?;

        if token.is_empty() {
            if self.credentials_optional {
                tracing::debug!("no jwt present, credentials optional");
                return Ok(());
            }
            return Err(JwtError::Missing);
        }

        let claims = self
            .validator
            .validate_token(parts, &token)
            .await
            .map_err(JwtError::Invalid)?;

        insert_claims(&mut parts.extensions, claims);
        Ok(())
    }

    /// Middleware body: authenticate, then either run `next` or hand the
    /// failure to the error handler.
    pub async fn check(&self, req: Request, next: Next) -> Response {
        let (mut parts, body) = req.into_parts();

        if let Err(err) = self.authenticate(&mut parts).await {
            tracing::warn!(
                error = %err,
                kind = ?err.kind(),
                method = %parts.method,
                path = %parts.uri.path(),
                "jwt check failed"
            );
            return (self.error_handler)(&parts, err);
        }

        next.run(Request::from_parts(parts, body)).await
    }
}

/// `axum::middleware::from_fn_with_state` entry point.
pub async fn check_jwt<V: ValidateToken>(
    State(m): State<Arc<JwtMiddleware<V>>>,
    req: Request,
    next: Next,
) -> Response {
    m.check(req, next).await
}

/// Put every route of `router` behind the JWT check.
///
/// ```ignore
/// let jwt = Arc::new(JwtMiddleware::new(validator, [with_credentials_optional(true)]));
/// let api = middleware::auth::apply(Router::new().route("/whoami", get(whoami)), jwt);
/// ```
pub fn apply<S, V>(router: Router<S>, jwt: Arc<JwtMiddleware<V>>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    V: ValidateToken,
{
    router.layer(middleware::from_fn_with_state(jwt, check_jwt::<V>))
}
