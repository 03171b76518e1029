//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CLINIC_*` environment variables and config
//! files, in that order of precedence.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use cap_std::{ambient_authority, fs::Dir};
use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroize;

use clinic_backend::domain::{
    AdminAccount, AdminAccountError, DEFAULT_SESSION_TTL, DEFAULT_UTC_OFFSET_MINUTES,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 5;
const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
/// One year.
const SESSION_TTL_MAX_HOURS: u32 = 24 * 366;
/// Shortest material `Key::derive_from` accepts.
const SESSION_KEY_DERIVE_MIN_LEN: usize = 32;

/// Build mode for settings validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing session key.
    Debug,
    /// Release builds require a long session key unless ephemeral keys are
    /// explicitly allowed.
    Release,
}

impl BuildMode {
    /// Mode matching the current build profile.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Errors raised while turning settings into server configuration.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// The bind address does not parse.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// Admin username or digest is unset.
    #[error("admin username and admin password digest must both be configured")]
    MissingAdminAccount,
    /// The configured admin account is malformed.
    #[error("invalid admin account: {0}")]
    AdminAccount(#[from] AdminAccountError),
    /// The session TTL is zero.
    #[error("admin session TTL must be at least one hour")]
    ZeroSessionTtl,
    /// The session TTL exceeds the supported maximum.
    #[error("admin session TTL of {hours} hours exceeds the {max} hour limit")]
    SessionTtlTooLong { hours: u32, max: u32 },
    /// The session key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file holds too few bytes.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

fn read_key_file(path: &Path) -> std::io::Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "key path must name a file")
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read(Path::new(file_name))
}

/// Settings for the clinic backend binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one, appointments are kept in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Clinic offset from UTC in minutes.
    pub utc_offset_minutes: Option<i32>,
    /// Administrator login name.
    pub admin_username: Option<String>,
    /// Hex SHA-256 digest of the administrator password.
    pub admin_password_sha256: Option<String>,
    /// Admin session lifetime in hours.
    pub session_ttl_hours: Option<u32>,
    /// File holding the cookie signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`. Unset means secure.
    pub cookie_secure: Option<bool>,
    /// Fall back to a random session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_key: bool,
}

impl AppSettings {
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Database URL, ignoring a blank value.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size, defaulting to five connections.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Clinic offset, defaulting to UTC+3.
    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes.unwrap_or(DEFAULT_UTC_OFFSET_MINUTES)
    }

    /// # Errors
    ///
    /// Fails when either half of the account is missing or malformed.
    pub fn admin_account(&self) -> Result<AdminAccount, SettingsError> {
        match (&self.admin_username, &self.admin_password_sha256) {
            (Some(username), Some(digest)) => Ok(AdminAccount::new(username, digest)?),
            _ => Err(SettingsError::MissingAdminAccount),
        }
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroSessionTtl`] for a zero-hour TTL and
    /// [`SettingsError::SessionTtlTooLong`] beyond a year.
    pub fn session_ttl(&self) -> Result<TimeDelta, SettingsError> {
        match self.session_ttl_hours {
            None => Ok(DEFAULT_SESSION_TTL),
            Some(0) => Err(SettingsError::ZeroSessionTtl),
            Some(hours) if hours > SESSION_TTL_MAX_HOURS => Err(SettingsError::SessionTtlTooLong {
                hours,
                max: SESSION_TTL_MAX_HOURS,
            }),
            Some(hours) => Ok(TimeDelta::hours(i64::from(hours))),
        }
    }

    /// Whether session cookies carry the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Key file location, falling back to the mounted secret path.
    pub fn session_key_path(&self) -> &Path {
        self.session_key_file
            .as_deref()
            .unwrap_or_else(|| Path::new(SESSION_KEY_DEFAULT_PATH))
    }

    /// Load the cookie signing key.
    ///
    /// # Errors
    ///
    /// Release builds reject keys shorter than 64 bytes, debug builds
    /// shorter than 32. Release builds also reject an unreadable key file
    /// unless `allow_ephemeral_key` is set.
    pub fn session_key(&self, mode: BuildMode) -> Result<Key, SettingsError> {
        let path = self.session_key_path();
        match read_key_file(path) {
            Ok(mut bytes) => {
                let length = bytes.len();
                let min_len = match mode {
                    BuildMode::Release => SESSION_KEY_MIN_LEN,
                    BuildMode::Debug => SESSION_KEY_DERIVE_MIN_LEN,
                };
                if length < min_len {
                    bytes.zeroize();
                    return Err(SettingsError::KeyTooShort {
                        path: path.to_path_buf(),
                        length,
                        min_len,
                    });
                }
                let key = Key::derive_from(&bytes);
                bytes.zeroize();
                Ok(key)
            }
            Err(error) if mode == BuildMode::Debug || self.allow_ephemeral_key => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key; sessions will not survive a restart"
                );
                Ok(Key::generate())
            }
            Err(source) => Err(SettingsError::KeyRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
