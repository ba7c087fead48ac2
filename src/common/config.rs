// src/common/config.rs
//! Environment configuration, read once at startup.

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Deployment environment. Only `Production` changes observable behaviour
/// (secure cross-site session cookies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(ConfigError::Invalid {
                key: "APP_ENV",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub token_secret: String,
    pub token_expiration_minutes: i64,
    pub cors_origins: Vec<String>,
    pub cookie_domain: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub contact_email: String,
    pub bcrypt_cost: u32,
    /// Drop and recreate every table before migrating.
    pub reset_db: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("APP_ENV").unwrap_or_default().parse()?;

        let token_secret = env::var("TOKEN_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("TOKEN_SECRET"))?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            environment,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://feedback_api.db".to_string()),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            port: parse_or("PORT", 8080)?,
            token_secret,
            token_expiration_minutes: parse_or("TOKEN_EXPIRATION_MINUTES", 20)?,
            cors_origins,
            cookie_domain: non_empty_var("COOKIE_DOMAIN"),
            sendgrid_api_key: non_empty_var("SENDGRID_API_KEY"),
            contact_email: env::var("CONTACT_EMAIL")
                .unwrap_or_else(|_| "contact@localhost".to_string()),
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            reset_db: flag_or("RESET_DB", false)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}

fn flag_or(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            parse_flag(&raw).ok_or(ConfigError::Invalid { key, value: raw })
        }
        _ => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
