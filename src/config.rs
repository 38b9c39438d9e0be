// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once, at process start, into
//! an [`AuthConfig`] that is handed to each component constructor. No
//! component reads the environment afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC secret for bearer credentials (≥ 32 bytes) | Required |
//! | `CREDENTIAL_TTL_SECS` | Lifetime of issued credentials | `3600` |
//! | `UPSTREAM_TIMEOUT_MS` | Deadline for key directory and storage calls | `5000` |
//! | `DATA_DIR` | Directory holding `authn.redb` | `/data` |
//! | `MIRROR_NODE_TESTNET_URL` | Testnet mirror node base URL | `https://testnet.mirrornode.hedera.com` |
//! | `MIRROR_NODE_MAINNET_URL` | Mainnet mirror node base URL | `https://mainnet-public.mirrornode.hedera.com` |
//! | `MIRROR_NODE_PREVIEWNET_URL` | Previewnet mirror node base URL | `https://previewnet.mirrornode.hedera.com` |
//! | `KEY_CACHE_CAPACITY` | Max cached account keys | `1024` |
//! | `KEY_CACHE_TTL_SECS` | Cached key lifetime | `300` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::directory::MirrorNodeUrls;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const CREDENTIAL_TTL_ENV: &str = "CREDENTIAL_TTL_SECS";
pub const UPSTREAM_TIMEOUT_ENV: &str = "UPSTREAM_TIMEOUT_MS";

/// Environment variable name for the data directory path.
///
/// The challenge database is created at `{DATA_DIR}/authn.redb`.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const MIRROR_NODE_TESTNET_ENV: &str = "MIRROR_NODE_TESTNET_URL";
pub const MIRROR_NODE_MAINNET_ENV: &str = "MIRROR_NODE_MAINNET_URL";
pub const MIRROR_NODE_PREVIEWNET_ENV: &str = "MIRROR_NODE_PREVIEWNET_URL";
pub const KEY_CACHE_CAPACITY_ENV: &str = "KEY_CACHE_CAPACITY";
pub const KEY_CACHE_TTL_ENV: &str = "KEY_CACHE_TTL_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "/data";
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_KEY_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_KEY_CACHE_TTL: Duration = Duration::from_secs(300);

const DEFAULT_TESTNET_URL: &str = "https://testnet.mirrornode.hedera.com";
const DEFAULT_MAINNET_URL: &str = "https://mainnet-public.mirrornode.hedera.com";
const DEFAULT_PREVIEWNET_URL: &str = "https://previewnet.mirrornode.hedera.com";

/// HS256 secrets shorter than the hash output are rejected.
pub const MIN_SECRET_LEN: usize = 32;

const DB_FILE_NAME: &str = "authn.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                reason: format!("expected `json` or `pretty`, got {other:?}"),
            }),
        }
    }
}

/// Server-held secret for signing and verifying bearer credentials.
///
/// `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSecret(Vec<u8>);

impl JwtSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(<redacted>)")
    }
}

/// Configuration for every authentication component.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: JwtSecret,
    pub credential_ttl: Duration,
    /// Deadline applied to each key directory and challenge storage call
    pub upstream_timeout: Duration,
    pub data_dir: PathBuf,
    pub mirror_nodes: MirrorNodeUrls,
    pub key_cache_capacity: usize,
    pub key_cache_ttl: Duration,
    pub log_format: LogFormat,
}

impl AuthConfig {
    /// Configuration with defaults for everything but the secret.
    pub fn new(jwt_secret: JwtSecret) -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret,
            credential_ttl: DEFAULT_CREDENTIAL_TTL,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            mirror_nodes: MirrorNodeUrls {
                testnet: parse_url(MIRROR_NODE_TESTNET_ENV, DEFAULT_TESTNET_URL)?,
                mainnet: parse_url(MIRROR_NODE_MAINNET_ENV, DEFAULT_MAINNET_URL)?,
                previewnet: parse_url(MIRROR_NODE_PREVIEWNET_ENV, DEFAULT_PREVIEWNET_URL)?,
            },
            key_cache_capacity: DEFAULT_KEY_CACHE_CAPACITY,
            key_cache_ttl: DEFAULT_KEY_CACHE_TTL,
            log_format: LogFormat::default(),
        })
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        let mut config = Self::new(JwtSecret::new(secret)?)?;

        if let Some(v) = lookup(CREDENTIAL_TTL_ENV) {
            config.credential_ttl = Duration::from_secs(parse_number(CREDENTIAL_TTL_ENV, &v)?);
        }
        if let Some(v) = lookup(UPSTREAM_TIMEOUT_ENV) {
            config.upstream_timeout = Duration::from_millis(parse_number(UPSTREAM_TIMEOUT_ENV, &v)?);
        }
        if let Some(v) = lookup(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(MIRROR_NODE_TESTNET_ENV) {
            config.mirror_nodes.testnet = parse_url(MIRROR_NODE_TESTNET_ENV, &v)?;
        }
        if let Some(v) = lookup(MIRROR_NODE_MAINNET_ENV) {
            config.mirror_nodes.mainnet = parse_url(MIRROR_NODE_MAINNET_ENV, &v)?;
        }
        if let Some(v) = lookup(MIRROR_NODE_PREVIEWNET_ENV) {
            config.mirror_nodes.previewnet = parse_url(MIRROR_NODE_PREVIEWNET_ENV, &v)?;
        }
        if let Some(v) = lookup(KEY_CACHE_CAPACITY_ENV) {
            config.key_cache_capacity = parse_number(KEY_CACHE_CAPACITY_ENV, &v)? as usize;
        }
        if let Some(v) = lookup(KEY_CACHE_TTL_ENV) {
            config.key_cache_ttl = Duration::from_secs(parse_number(KEY_CACHE_TTL_ENV, &v)?);
        }
        if let Some(v) = lookup(LOG_FORMAT_ENV) {
            config.log_format = v.parse()?;
        }

        if config.credential_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                name: CREDENTIAL_TTL_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }
        if config.upstream_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: UPSTREAM_TIMEOUT_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(config)
    }

    /// Path of the challenge database file.
    pub fn challenge_db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("{e}"),
    })
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("{e}"),
    })
}
