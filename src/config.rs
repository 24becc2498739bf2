use std::env;
use std::fmt::Display;
use std::str::FromStr;

use chrono::Duration;
use eyre::{eyre, Result, WrapErr};
use log::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub site_url: String,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub app_env: String,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| eyre!("DATABASE_URL is not set"))?;
        let session_ttl_days: i64 = parse_or(&lookup, "SESSION_TTL_DAYS", "7")?;
        Ok(Config {
            database_url,
            bind_address: parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:8080")?,
            site_url: parse_or(&lookup, "SITE_URL", "http://localhost:3000")?,
            resend_api_key: lookup("RESEND_API_KEY").filter(|key| !key.is_empty()),
            email_from: parse_or(&lookup, "EMAIL_FROM", "noreply@amisag.com")?,
            app_env: parse_or(&lookup, "APP_ENV", "production")?,
            session_ttl: Duration::days(session_ttl_days),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    });
    raw.parse()
        .map_err(|e: T::Err| eyre!("{}", e))
        .wrap_err_with(|| format!("Invalid {} value", key))
}
