/*
 * Responsibility
 * - define the v1 URL layout
 * - decide which routes require a JWT and which only read one if present
 */
use std::sync::Arc;

use axum::{Router, routing::get};

use crate::api::v1::handlers::me::{me, whoami};
use crate::middleware::auth::{self, JwtMiddleware, ValidateToken};
use crate::services::auth::AccessTokenClaims;

/// JWT middlewares for the two credential policies used by v1.
pub struct JwtLayers<V> {
    /// Missing token is a 400.
    pub required: Arc<JwtMiddleware<V>>,
    /// Missing token passes through without claims.
    pub optional: Arc<JwtMiddleware<V>>,
}

pub fn routes<V>(jwt: JwtLayers<V>) -> Router
where
    V: ValidateToken<Claims = AccessTokenClaims>,
{
    let required = auth::apply(Router::new().route("/me", get(me)), jwt.required);
    let optional = auth::apply(Router::new().route("/whoami", get(whoami)), jwt.optional);

    required.merge(optional)
}
