//! Runtime configuration read from the environment

use anyhow::Context;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

/// Token signing settings
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: chrono::Duration,
    pub refresh_token_ttl: chrono::Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

impl AuthConfig {
    pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
    pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

    /// Settings with the default token lifetimes
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl: chrono::Duration::minutes(Self::DEFAULT_ACCESS_TTL_MINUTES),
            refresh_token_ttl: chrono::Duration::days(Self::DEFAULT_REFRESH_TTL_DAYS),
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the configuration
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?;

        let access_minutes = parse_var("ACCESS_TOKEN_TTL_MINUTES", AuthConfig::DEFAULT_ACCESS_TTL_MINUTES)?;
        let refresh_days = parse_var("REFRESH_TOKEN_TTL_DAYS", AuthConfig::DEFAULT_REFRESH_TTL_DAYS)?;

        Ok(Self {
            database_url,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000)?,
            auth: AuthConfig {
                jwt_secret,
                access_token_ttl: chrono::Duration::minutes(access_minutes),
                refresh_token_ttl: chrono::Duration::days(refresh_days),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}
