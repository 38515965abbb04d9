//! Runtime configuration, read from the environment (and `.env` via dotenv).

use std::{fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use axum::http::HeaderName;
use thiserror::Error;

use crate::pictures::WritePolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Header carrying the authenticated user id, set by the gateway in front of us.
    pub caller_header: HeaderName,
    pub picture_dir: PathBuf,
    /// JPEG quality, 1..=100.
    pub picture_quality: u8,
    pub max_upload_bytes: usize,
    pub picture_write_policy: WritePolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let picture_quality: u8 = parse_or(&lookup, "PICTURE_QUALITY", 75)?;
        if !(1..=100).contains(&picture_quality) {
            return Err(ConfigError::Invalid {
                key: "PICTURE_QUALITY",
                value: picture_quality.to_string(),
                reason: "must be between 1 and 100".to_owned(),
            });
        }

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://whispers.db".to_owned()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 16)?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            caller_header: parse_or(&lookup, "CALLER_HEADER", HeaderName::from_static("x-user-id"))?,
            picture_dir: lookup("PICTURE_DIR").map(PathBuf::from).unwrap_or_else(|| "pictures".into()),
            picture_quality,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            picture_write_policy: parse_or(&lookup, "PICTURE_WRITE_POLICY", WritePolicy::Anyone)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
            value,
        }),
    }
}
