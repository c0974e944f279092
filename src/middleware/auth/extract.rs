//! Token extractors: where to find the credential in a request.
//!
//! An extractor returns `Ok(String::new())` when no credential is present and
//! an error only when the request carries something it cannot make sense of.
//! The middleware treats the two very differently (missing vs. internal
//! failure), so extractors should not turn "absent" into an error.

use std::sync::Arc;

use axum::http::{header, request::Parts};
use thiserror::Error;

use crate::error::BoxError;

/// Locates a token in the request head.
pub type TokenExtractor = Arc<dyn Fn(&Parts) -> Result<String, BoxError> + Send + Sync>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("authorization header format must be Bearer {{token}}")]
    AuthHeaderFormat,
    #[error("authorization header contains non-visible characters")]
    AuthHeaderEncoding,
    #[error("cookie header contains non-visible characters")]
    CookieHeaderEncoding,
}

/// Wrap any closure as a [`TokenExtractor`].
pub fn token_extractor<F>(f: F) -> TokenExtractor
where
    F: Fn(&Parts) -> Result<String, BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// `Authorization: Bearer <token>`. The scheme is matched case-insensitively.
pub fn auth_header_token_extractor(parts: &Parts) -> Result<String, BoxError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(String::new());
    };

    let value = value.to_str().map_err(|_| ExtractError::AuthHeaderEncoding)?;
    if value.is_empty() {
        return Ok(String::new());
    }

    let fields: Vec<&str> = value.split_whitespace().collect();
    match fields.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok((*token).to_string()),
        _ => Err(ExtractError::AuthHeaderFormat.into()),
    }
}

/// Reads the token from the cookie called `name`.
pub fn cookie_token_extractor(name: impl Into<String>) -> TokenExtractor {
    let name = name.into();
    token_extractor(move |parts| {
        for value in parts.headers.get_all(header::COOKIE) {
            let value = value
                .to_str()
                .map_err(|_| ExtractError::CookieHeaderEncoding)?;

            let found = value
                .split(';')
                .filter_map(|pair| pair.trim().split_once('='))
                .find(|(k, _)| k.trim() == name)
                .map(|(_, v)| v.trim().trim_matches('"').to_string());

            if let Some(token) = found {
                return Ok(token);
            }
        }
        Ok(String::new())
    })
}

/// Reads the token from the query parameter called `name` (first occurrence).
pub fn parameter_token_extractor(name: impl Into<String>) -> TokenExtractor {
    let name = name.into();
    token_extractor(move |parts| {
        let token = parts
            .uri
            .query()
            .and_then(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| v.into_owned())
            })
            .unwrap_or_default();
        Ok(token)
    })
}

/// Tries each extractor in order. The first error aborts, the first
/// non-empty token wins.
pub fn multi_token_extractor(extractors: Vec<TokenExtractor>) -> TokenExtractor {
    token_extractor(move |parts| {
        for extractor in &extractors {
            let token = extractor(parts)?;
            if !token.is_empty() {
                return Ok(token);
            }
        }
        Ok(String::new())
    })
}
