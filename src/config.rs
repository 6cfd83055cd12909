use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Signing secret used when `JWT_SECRET_KEY` is not set. Never use it in production.
pub const DEFAULT_JWT_SECRET: &str = "super-secret-key";

/// Token lifetimes accepted from `JWT_TTL_MINUTES`: one minute up to one year.
pub const JWT_TTL_MINUTES_RANGE: std::ops::RangeInclusive<i64> = 1..=525_600;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` means no database is configured and the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| normalize_database_url(&v));

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET_KEY").unwrap_or_else(|| DEFAULT_JWT_SECRET.into()),
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "authgate".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "authgate-users".into()),
            ttl_minutes: match lookup("JWT_TTL_MINUTES") {
                Some(v) => parse_ttl_minutes(&v)?,
                None => 15,
            },
        };

        let debug = lookup("APP_DEBUG")
            .or_else(|| lookup("FLASK_DEBUG"))
            .map(|v| v == "1")
            .unwrap_or(false);

        let port = match lookup("PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {v}"))?,
            None => 3001,
        };

        Ok(Self {
            database_url,
            jwt,
            debug,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
        })
    }

    pub fn is_development(&self) -> bool {
        self.debug
    }
}

fn parse_ttl_minutes(raw: &str) -> anyhow::Result<i64> {
    let minutes = raw
        .parse::<i64>()
        .with_context(|| format!("JWT_TTL_MINUTES is not a number: {raw}"))?;
    if !JWT_TTL_MINUTES_RANGE.contains(&minutes) {
        anyhow::bail!(
            "JWT_TTL_MINUTES must be between {} and {}, got {minutes}",
            JWT_TTL_MINUTES_RANGE.start(),
            JWT_TTL_MINUTES_RANGE.end()
        );
    }
    Ok(minutes)
}

/// Rewrites the legacy `postgres://` scheme some hosting providers still hand out.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    }
}
