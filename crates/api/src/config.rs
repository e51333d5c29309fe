//! Runtime configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Upper bound for `TOKEN_TTL_HOURS` (ten years).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// `BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `JWT_SECRET`
    pub jwt_secret: String,
    /// `TOKEN_TTL_HOURS`
    pub token_ttl_hours: i64,
    /// `SEED_DEMO_DATA`: demo accounts, class and progress (the topic catalog is always loaded).
    pub seed_demo_data: bool,
    /// `CORS_ORIGINS`: comma separated; empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: learnhub_auth::Hs256Jwt::DEFAULT_TTL_HOURS,
            seed_demo_data: true,
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("BIND_ADDR") {
            config.bind_addr = v.trim().parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "BIND_ADDR",
                value: v.clone(),
                reason: e.to_string(),
            })?;
        }

        match lookup("JWT_SECRET") {
            Some(v) if !v.trim().is_empty() => config.jwt_secret = v,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    var: "JWT_SECRET",
                    value: v,
                    reason: "must not be empty".to_string(),
                });
            }
            None => tracing::warn!("JWT_SECRET not set; using insecure dev default"),
        }

        if let Some(v) = lookup("TOKEN_TTL_HOURS") {
            config.token_ttl_hours = match v.trim().parse::<i64>() {
                Ok(h) if (1..=MAX_TOKEN_TTL_HOURS).contains(&h) => h,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "TOKEN_TTL_HOURS",
                        value: v,
                        reason: format!("expected between 1 and {MAX_TOKEN_TTL_HOURS} hours"),
                    });
                }
            };
        }

        if let Some(v) = lookup("SEED_DEMO_DATA") {
            config.seed_demo_data = parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                var: "SEED_DEMO_DATA",
                value: v.clone(),
                reason: "expected true/false".to_string(),
            })?;
        }

        if let Some(v) = lookup("CORS_ORIGINS") {
            config.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
