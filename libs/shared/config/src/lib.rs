use std::env;

use anyhow::{Context, Result};
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Signing key for session tokens. Required, immutable for the process
    /// lifetime.
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("APP_JWT_SECRET")
            .context("APP_JWT_SECRET is not set; refusing to start without a signing key")?;

        let token_ttl_hours = match env::var("APP_TOKEN_TTL_HOURS") {
            Ok(raw) => raw
                .parse()
                .context("APP_TOKEN_TTL_HOURS is not a valid number of hours")?,
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => {
                warn!("PORT not set, using default {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        Ok(Self {
            jwt_secret,
            token_ttl_hours,
            port,
        })
    }
}
