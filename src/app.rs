/*
 * Responsibility
 * - load Config, build the validator and the JWT middlewares, assemble the Router
 * - apply the HTTP layers (request-id / trace / limits)
 * - start axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, VerificationKey};
use crate::middleware::{
    self,
    auth::{JwtMiddleware, ValidateToken, with_credentials_optional, with_validate_on_options},
};
use crate::services::auth::{AccessTokenClaims, JwtValidator};

/// Used when RUST_LOG is unset, e.g. `RUST_LOG=debug,tower_http=debug`.
const DEFAULT_LOG_FILTER: &str = "info,jwt_middleware=debug,tower_http=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// Route panics through tracing. Outside production the process aborts
/// instead of unwinding into the default hook.
fn init_panic_hook(abort_on_panic: bool) {
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string payload>");
        tracing::error!(%location, payload, "panic");

        if abort_on_panic {
            process::abort();
        }
        previous(info);
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let validator = build_validator(&config)?;
    let jwt = build_jwt_middlewares(validator, &config);
    let app = build_router(jwt, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_validator(config: &Config) -> Result<JwtValidator<AccessTokenClaims>> {
    let validator = match &config.verification_key {
        VerificationKey::Ed25519Pem(pem) => JwtValidator::from_ed_pem(
            pem,
            &config.auth_issuer,
            &config.auth_audience,
            config.access_token_leeway_seconds,
        )
        .context("invalid ACCESS_JWT_PUBLIC_KEY_PEM")?,
        VerificationKey::Hs256Secret(secret) => JwtValidator::from_secret(
            secret.as_bytes(),
            &config.auth_issuer,
            &config.auth_audience,
            config.access_token_leeway_seconds,
        ),
    };
    Ok(validator)
}

/// One middleware per credential policy, both backed by the same validator.
pub fn build_jwt_middlewares<V: ValidateToken>(
    validator: V,
    config: &Config,
) -> api::v1::JwtLayers<Arc<V>> {
    let validator = Arc::new(validator);
    let build = |optional: bool| {
        Arc::new(JwtMiddleware::new(
            validator.clone(),
            [
                with_credentials_optional(optional),
                with_validate_on_options(config.validate_on_options),
            ],
        ))
    };

    api::v1::JwtLayers {
        required: build(false),
        optional: build(true),
    }
}

pub fn build_router<V>(jwt: api::v1::JwtLayers<V>, config: &Config) -> Router
where
    V: ValidateToken<Claims = AccessTokenClaims>,
{
    let v1 = api::v1::routes(jwt);

    let router = Router::new()
        .route("/health", get(api::v1::handlers::health::health))
        .nest("/api/v1", v1);

    middleware::http::apply(router, config)
}
