use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

/// Token lifetimes are capped at one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Outbound relay. Every user authenticates against the same host.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    /// Offset applied to UTC to get the wall clock reminders are written in.
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub dispatch: DispatchConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: get("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "remindmail".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "remindmail-users".into()),
            ttl_minutes: parsed::<i64>(&get, "JWT_TTL_MINUTES", 60).clamp(1, MAX_TTL_MINUTES),
            refresh_ttl_minutes: parsed::<i64>(&get, "JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14)
                .clamp(1, MAX_TTL_MINUTES),
        };
        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".into()),
            port: parsed(&get, "SMTP_PORT", 587),
            timeout_secs: parsed(&get, "SMTP_TIMEOUT_SECS", 20),
        };
        let dispatch = DispatchConfig {
            enabled: parsed(&get, "DISPATCH_ENABLED", true),
            interval_secs: parsed::<u64>(&get, "DISPATCH_INTERVAL_SECS", 60).max(1),
            utc_offset_minutes: parsed(&get, "REMINDER_UTC_OFFSET_MINUTES", 0),
        };
        Ok(Self {
            database_url,
            jwt,
            smtp,
            dispatch,
        })
    }
}

// Unset or unparseable values fall back to the default.
fn parsed<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    get(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
