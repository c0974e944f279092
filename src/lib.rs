//! JWT bearer middleware for axum.
//!
//! The middleware pulls a token out of the request, hands it to a
//! caller-supplied [`ValidateToken`](middleware::auth::ValidateToken) and
//! either attaches the resulting claims to the request or answers with a
//! JSON error:
//!
//! | failure | status | body |
//! |---|---|---|
//! | no token | 400 | `{"message": "JWT is missing."}` |
//! | validator rejected it | 401 | `{"message": "JWT is invalid."}` |
//! | anything else | 500 | `{"message": "Something went wrong while checking the JWT."}` |
//!
//! ```ignore
//! let validator = JwtValidator::<AccessTokenClaims>::from_secret(secret, issuer, audience, 60);
//! let jwt = Arc::new(JwtMiddleware::new(validator, [with_credentials_optional(true)]));
//! let app = middleware::auth::apply(Router::new().route("/me", get(me)), jwt);
//!
//! async fn me(Claims(claims): Claims<AccessTokenClaims>) -> String {
//!     claims.sub
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;

pub use error::{BoxError, ErrorKind, JwtError};
pub use middleware::auth::{
    Claims, JwtMiddleware, JwtOption, ValidateToken, claims_from_extensions, validate_fn,
};
