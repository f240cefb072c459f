// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC secret for signing and verifying tokens | Required |
//! | `DATA_DIR` | Root directory for flat-file storage | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `SEED_USERS` | JSON file of users to create at startup | None |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::{AuthError, SigningSecret};
use crate::storage::paths::DATA_ROOT;

/// Environment variable name for the token signing secret.
///
/// Rotating the secret invalidates every outstanding token.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the storage root.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Environment variable name for the user seed file. Plaintext passwords in
/// the file are hashed on load.
pub const SEED_USERS_ENV: &str = "SEED_USERS";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET: {0}")]
    Secret(#[from] AuthError),

    #[error("invalid PORT: {0}")]
    InvalidPort(String),

    #[error("invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("invalid LOG_FORMAT: {0} (expected `json` or `pretty`)")]
    InvalidLogFormat(String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret: SigningSecret,
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub seed_users: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// Fails with [`AuthError::MisconfiguredSecret`] when the secret is
    /// missing or blank; the service must not start in that case.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = SigningSecret::new(lookup(JWT_SECRET_ENV).unwrap_or_default())?;

        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DATA_ROOT.to_string())
            .into();

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("{host}:{port}")))?;

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("") => LogFormat::default(),
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(f) if f.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        let seed_users = lookup(SEED_USERS_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            secret,
            data_dir,
            bind_addr,
            log_format,
            seed_users,
        })
    }
}
