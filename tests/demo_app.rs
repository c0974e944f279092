use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::{Method, StatusCode},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use jwt_middleware::{
    app::{build_jwt_middlewares, build_router, build_validator},
    config::Config,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const ISSUER: &str = "https://issuer.test";
const AUDIENCE: &str = "demo-api";
const SECRET: &str = "demo-secret-demo-secret-demo-secret";

fn config(extra: &[(&str, &str)]) -> Config {
    let mut vars = vec![
        ("AUTH_ISSUER", ISSUER),
        ("AUTH_AUDIENCE", AUDIENCE),
        ("ACCESS_JWT_HS256_SECRET", SECRET),
        ("ACCESS_TOKEN_LEEWAY_SECONDS", "0"),
    ];
    vars.extend_from_slice(extra);
    Config::from_lookup(|key| {
        vars.iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("config")
}

fn app(config: &Config) -> Router {
    let validator = build_validator(config).expect("validator");
    build_router(build_jwt_middlewares(validator, config), config)
}

fn token(sub: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_secs() as i64;
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": sub,
            "exp": now + exp_offset,
            "scope": "posts:read posts:write",
        }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign")
}

async fn send(app: &Router, method: Method, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let res = app
        .clone()
        .oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("infallible");

    assert!(res.headers().contains_key("x-request-id"));

    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_is_public() {
    let app = app(&config(&[]));

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn me_returns_verified_claims() {
    let app = app(&config(&[]));

    let (status, body) = send(&app, Method::GET, "/api/v1/me", Some(&token("user-42", 300))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sub"], "user-42");
    assert_eq!(body["iss"], ISSUER);
    assert_eq!(body["aud"], AUDIENCE);
}

#[tokio::test]
async fn me_rejects_missing_and_expired_tokens() {
    let app = app(&config(&[]));

    let (status, body) = send(&app, Method::GET, "/api/v1/me", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "JWT is missing." }));

    let (status, body) = send(&app, Method::GET, "/api/v1/me", Some(&token("user-42", -3600))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "JWT is invalid." }));

    let (status, _) = send(&app, Method::GET, "/api/v1/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_accepts_anonymous_requests_under_default_config() {
    let app = app(&config(&[]));

    let (status, body) = send(&app, Method::GET, "/api/v1/whoami", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "sub": null, "scopes": [] }));

    let (status, body) = send(&app, Method::GET, "/api/v1/whoami", Some(&token("user-7", 300))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "sub": "user-7", "scopes": ["posts:read", "posts:write"] })
    );

    // A bad token is still rejected on the optional route.
    let (status, body) = send(&app, Method::GET, "/api/v1/whoami", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "JWT is invalid." }));

    // The same app still requires a token on /me.
    let (status, body) = send(&app, Method::GET, "/api/v1/me", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "JWT is missing." }));
}

#[tokio::test]
async fn empty_subject_is_rejected_by_strict_claims() {
    let app = app(&config(&[]));

    let (status, _) = send(&app, Method::GET, "/api/v1/me", Some(&token("", 300))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
