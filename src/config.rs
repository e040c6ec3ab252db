use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::error::AppError;

pub const DEFAULT_EXCHANGE_API_URL: &str = "https://api.apilayer.com/currency_data/live";

/// How `/exchange` treats the requested base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMode {
    /// Any base from the currency set, cross rates derived from USD quotes.
    Derived,
    /// Always the provider's USD-anchored quotes.
    UsdAnchored,
}

impl FromStr for RateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "derived" => Ok(RateMode::Derived),
            "usd" | "usd-anchored" => Ok(RateMode::UsdAnchored),
            other => anyhow::bail!("unknown rate mode '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbSettings {
    pub host: Option<String>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub port: u16,
    pub ssl_mode: PgSslMode,
    pub connect_timeout: Duration,
}

impl DbSettings {
    /// Checks that host, database, user and password are all present and
    /// builds connect options from them. No connection is attempted.
    pub fn connect_options(&self) -> Result<PgConnectOptions, AppError> {
        let required = [
            ("host", "DB_HOST", &self.host),
            ("database", "DB_NAME", &self.name),
            ("user", "DB_USER", &self.user),
            ("password", "DB_PASS", &self.password),
        ];
        let missing: Vec<_> = required
            .iter()
            .filter(|(_, _, value)| value.is_none())
            .collect();

        if !missing.is_empty() {
            let keys: Vec<&str> = missing.iter().map(|(key, _, _)| *key).collect();
            let vars: Vec<&str> = missing.iter().map(|(_, var, _)| *var).collect();
            return Err(AppError::Config(format!(
                "Missing database configuration: {}. \
                 Please set the following environment variables: {}",
                keys.join(", "),
                vars.join(", ")
            )));
        }

        Ok(PgConnectOptions::new()
            .host(self.host.as_deref().unwrap_or_default())
            .port(self.port)
            .database(self.name.as_deref().unwrap_or_default())
            .username(self.user.as_deref().unwrap_or_default())
            .password(self.password.as_deref().unwrap_or_default())
            .ssl_mode(self.ssl_mode))
    }

    pub fn host_label(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or("<unset>"),
            self.port
        )
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    pub route_prefix: String,
    pub rate_mode: RateMode,
    pub exchange_api_url: String,
    pub exchange_api_key: Option<String>,
    pub db: DbSettings,
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_str(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value '{}' for {}", raw, name)),
        None => Ok(default),
    }
}

/// Normalizes a prefix to either "" or "/segment" without a trailing slash.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let db = DbSettings {
            host: env_opt("DB_HOST"),
            name: env_opt("DB_NAME"),
            user: env_opt("DB_USER"),
            password: env_opt("DB_PASS"),
            port: env_parse("DB_PORT", 5432)?,
            ssl_mode: env_parse("DB_SSLMODE", PgSslMode::Require)?,
            connect_timeout: Duration::from_secs(env_parse("DB_CONNECT_TIMEOUT", 10)?),
        };

        Ok(AppConfig {
            bind: env_str("BIND_ADDR", "0.0.0.0"),
            port: env_parse("PORT", 5001)?,
            route_prefix: normalize_prefix(&env_str("ROUTE_PREFIX", "")),
            rate_mode: env_parse("RATE_MODE", RateMode::Derived)?,
            exchange_api_url: env_str("EXCHANGE_API_URL", DEFAULT_EXCHANGE_API_URL),
            exchange_api_key: env_opt("API_KEY_EXCHANGE"),
            db,
        })
    }
}
