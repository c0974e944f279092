use std::marker::PhantomData;

use async_trait::async_trait;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::BoxError;
use crate::middleware::auth::ValidateToken;

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug, Error)]
pub enum AccessJwtError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("missing or invalid 'aud' claim")]
    MissingOrInvalidAud,
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
    #[error("invalid key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),
}

fn aud_is_present_and_valid(aud: &serde_json::Value) -> bool {
    match aud {
        serde_json::Value::String(s) => !s.trim().is_empty(),
        serde_json::Value::Array(arr) => arr.iter().any(|v| match v {
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// Access token (JWT) claims used by the demo server.
///
/// `aud` can be either a string or an array; jsonwebtoken checks it against
/// the configured audience, we only keep it as a raw value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    #[serde(default)]
    pub aud: serde_json::Value,

    pub sub: String,
    pub exp: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Claim checks run after signature and registered-claim validation.
pub trait CheckClaims {
    fn check_claims(&self) -> Result<(), AccessJwtError> {
        Ok(())
    }
}

impl CheckClaims for serde_json::Value {}

impl CheckClaims for AccessTokenClaims {
    /// Required (non-empty) checks on top of what `Validation` enforces.
    fn check_claims(&self) -> Result<(), AccessJwtError> {
        if self.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }
        if self.sub.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("sub"));
        }
        if self.exp == 0 {
            return Err(AccessJwtError::EmptyClaim("exp"));
        }
        if !aud_is_present_and_valid(&self.aud) {
            return Err(AccessJwtError::MissingOrInvalidAud);
        }
        Ok(())
    }
}

impl AccessTokenClaims {
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }
}

/// jsonwebtoken-backed [`ValidateToken`] decoding into `T`.
///
/// - Key material is intentionally not printable via Debug.
pub struct JwtValidator<T> {
    decoding_key: DecodingKey,
    validation: Validation,
    _claims: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for JwtValidator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtValidator")
            .field("validation", &self.validation)
            .finish()
    }
}

impl<T: DeserializeOwned + CheckClaims + Clone> JwtValidator<T> {
    pub fn new(
        decoding_key: DecodingKey,
        algorithm: Algorithm,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
            _claims: PhantomData,
        }
    }

    /// HS256 with a shared secret.
    pub fn from_secret(secret: &[u8], issuer: &str, audience: &str, leeway_seconds: u64) -> Self {
        Self::new(
            DecodingKey::from_secret(secret),
            Algorithm::HS256,
            issuer,
            audience,
            leeway_seconds,
        )
    }

    /// EdDSA (Ed25519) with a PEM public key.
    pub fn from_ed_pem(
        public_key_pem: &str,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, AccessJwtError> {
        let decoding_key = DecodingKey::from_ed_pem(public_key_pem.as_bytes())
            .map_err(AccessJwtError::InvalidKey)?;

        Ok(Self::new(
            decoding_key,
            Algorithm::EdDSA,
            issuer,
            audience,
            leeway_seconds,
        ))
    }

    /// Verify signature + registered claims, then the claim type's own checks.
    pub fn verify(&self, token: &str) -> Result<T, AccessJwtError> {
        let data = jsonwebtoken::decode::<T>(token, &self.decoding_key, &self.validation)?;
        data.claims.check_claims()?;
        Ok(data.claims)
    }
}

#[async_trait]
impl<T> ValidateToken for JwtValidator<T>
where
    T: DeserializeOwned + CheckClaims + Clone + Send + Sync + 'static,
{
    type Claims = T;

    async fn validate_token(&self, _parts: &Parts, token: &str) -> Result<T, BoxError> {
        Ok(self.verify(token)?)
    }
}
