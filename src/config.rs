/*
 * Responsibility
 * - read environment variables (PORT, issuer/audience, verification key, middleware flags)
 * - validate values (missing or malformed values fail startup)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Key material used to verify access tokens.
#[derive(Clone, PartialEq, Eq)]
pub enum VerificationKey {
    Ed25519Pem(String),
    Hs256Secret(String),
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        match self {
            Self::Ed25519Pem(_) => f.write_str("Ed25519Pem(..)"),
            Self::Hs256Secret(_) => f.write_str("Hs256Secret(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub access_token_leeway_seconds: u64,
    pub verification_key: VerificationKey,

    pub validate_on_options: bool,

    pub request_timeout_seconds: u64,
    pub body_limit_bytes: usize,
}

fn parse_bool(value: Option<String>, default: bool, key: &'static str) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(key)),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source (the process env in production).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let auth_issuer = get("AUTH_ISSUER")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience = get("AUTH_AUDIENCE")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let access_token_leeway_seconds = match get("ACCESS_TOKEN_LEEWAY_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"))?,
            None => 60,
        };

        // PEM wins when both are set.
        let verification_key = match (get("ACCESS_JWT_PUBLIC_KEY_PEM"), get("ACCESS_JWT_HS256_SECRET")) {
            (Some(pem), _) => VerificationKey::Ed25519Pem(pem.replace("\\n", "\n")),
            (None, Some(secret)) if !secret.is_empty() => VerificationKey::Hs256Secret(secret),
            (None, Some(_)) => return Err(ConfigError::Invalid("ACCESS_JWT_HS256_SECRET")),
            (None, None) => return Err(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM")),
        };

        let validate_on_options = parse_bool(
            get("JWT_VALIDATE_ON_OPTIONS"),
            true,
            "JWT_VALIDATE_ON_OPTIONS",
        )?;

        let request_timeout_seconds = match get("REQUEST_TIMEOUT_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            None => 30,
        };

        let body_limit_bytes = match get("BODY_LIMIT_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or(ConfigError::Invalid("BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        Ok(Self {
            addr,
            app_env,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            verification_key,
            validate_on_options,
            request_timeout_seconds,
            body_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("AUTH_ISSUER", "https://issuer.test"),
        ("AUTH_AUDIENCE", "api"),
        ("ACCESS_JWT_HS256_SECRET", "s3cret"),
    ];

    #[test]
    fn defaults() {
        let c = config(&REQUIRED).expect("config");

        assert_eq!(c.addr.port(), 3000);
        assert_eq!(c.app_env, AppEnv::Development);
        assert_eq!(c.access_token_leeway_seconds, 60);
        assert_eq!(c.verification_key, VerificationKey::Hs256Secret("s3cret".into()));
        assert!(c.validate_on_options);
        assert_eq!(c.request_timeout_seconds, 30);
        assert_eq!(c.body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn middleware_flags() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("JWT_VALIDATE_ON_OPTIONS", "0"));
        vars.push(("APP_ENV", "prod"));

        let c = config(&vars).expect("config");
        assert!(!c.validate_on_options);
        assert!(c.app_env.is_production());

        vars.push(("JWT_VALIDATE_ON_OPTIONS", "maybe"));
        // later entries overwrite earlier ones in the map
        assert_eq!(
            config(&vars).unwrap_err(),
            ConfigError::Invalid("JWT_VALIDATE_ON_OPTIONS")
        );
    }

    #[test]
    fn missing_required_values() {
        assert_eq!(
            config(&[("AUTH_AUDIENCE", "api"), ("ACCESS_JWT_HS256_SECRET", "x")]).unwrap_err(),
            ConfigError::Missing("AUTH_ISSUER")
        );
        assert_eq!(
            config(&[("AUTH_ISSUER", "i"), ("AUTH_AUDIENCE", "api")]).unwrap_err(),
            ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM")
        );
    }

    #[test]
    fn pem_wins_and_newlines_are_unescaped() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ACCESS_JWT_PUBLIC_KEY_PEM", "-----BEGIN-----\\nabc\\n-----END-----"));

        let c = config(&vars).expect("config");
        assert_eq!(
            c.verification_key,
            VerificationKey::Ed25519Pem("-----BEGIN-----\nabc\n-----END-----".into())
        );
    }

    #[test]
    fn invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "http"));
        assert_eq!(config(&vars).unwrap_err(), ConfigError::Invalid("PORT"));
    }

    #[test]
    fn invalid_request_timeout() {
        for bad in ["thirty", "0", "-1"] {
            let mut vars = REQUIRED.to_vec();
            vars.push(("REQUEST_TIMEOUT_SECONDS", bad));
            assert_eq!(
                config(&vars).unwrap_err(),
                ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"),
                "{bad}"
            );
        }

        let mut vars = REQUIRED.to_vec();
        vars.push(("REQUEST_TIMEOUT_SECONDS", "5"));
        assert_eq!(config(&vars).expect("config").request_timeout_seconds, 5);
    }

    #[test]
    fn invalid_body_limit() {
        for bad in ["-5", "1MiB", "0"] {
            let mut vars = REQUIRED.to_vec();
            vars.push(("BODY_LIMIT_BYTES", bad));
            assert_eq!(
                config(&vars).unwrap_err(),
                ConfigError::Invalid("BODY_LIMIT_BYTES"),
                "{bad}"
            );
        }

        let mut vars = REQUIRED.to_vec();
        vars.push(("BODY_LIMIT_BYTES", "4096"));
        assert_eq!(config(&vars).expect("config").body_limit_bytes, 4096);
    }
}
