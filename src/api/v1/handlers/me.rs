/*
 * Responsibility
 * - GET /api/v1/me: verified claims, 401 when none were attached
 * - GET /api/v1/whoami: subject if authenticated, null otherwise
 */
use axum::Json;
use serde::Serialize;

use crate::middleware::auth::Claims;
use crate::services::auth::AccessTokenClaims;

pub async fn me(Claims(claims): Claims<AccessTokenClaims>) -> Json<AccessTokenClaims> {
    Json(claims)
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub sub: Option<String>,
    pub scopes: Vec<String>,
}

pub async fn whoami(claims: Option<Claims<AccessTokenClaims>>) -> Json<WhoAmI> {
    let body = match claims {
        Some(Claims(c)) => WhoAmI {
            scopes: c.scopes().map(str::to_string).collect(),
            sub: Some(c.sub),
        },
        None => WhoAmI {
            sub: None,
            scopes: Vec::new(),
        },
    };
    Json(body)
}
