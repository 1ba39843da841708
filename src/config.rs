use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub environment: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // No embedded fallback connection string: a missing DATABASE_URL is a
        // hard startup error rather than a silent connect to a remote default.
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "hifztracker".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let admin_email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin".into());
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
        Ok(Self {
            database_url,
            jwt,
            environment,
            admin_email,
            admin_password,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
