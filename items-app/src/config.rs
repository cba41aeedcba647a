//! Configuration loading from environment.

use std::env;

use items_hex::{Credentials, inbound::DEFAULT_ALLOWED_ORIGIN};

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub allowed_origin: String,
    pub credentials: Credentials,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from any key lookup, applying defaults for
    /// missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "8000")
            .parse()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?;

        let defaults = Credentials::default();
        let credentials = Credentials {
            username: var("AUTH_USERNAME", &defaults.username),
            password: var("AUTH_PASSWORD", &defaults.password),
            token: var("AUTH_TOKEN", &defaults.token),
            subject: var("AUTH_SUBJECT", &defaults.subject),
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            database_url: var("DATABASE_URL", "sqlite://items.db?mode=rwc"),
            allowed_origin: var("CORS_ORIGIN", DEFAULT_ALLOWED_ORIGIN),
            credentials,
        })
    }

    /// Address the listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
