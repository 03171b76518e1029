//! Administrator authentication primitives.
//!
//! The clinic has a single administrative account configured at deploy time.
//! A successful login yields an opaque session token; presenting the token
//! later yields an [`AdminCapability`], which every administrative operation
//! takes as an explicit argument.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Hex-encoded SHA-256 of `input`.
///
/// # Examples
/// ```
/// use clinic_backend::domain::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn sha256_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

/// Credentials submitted to the admin login form.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and kept verbatim, zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl AdminCredentials {
    /// Validate raw login input.
    ///
    /// # Errors
    ///
    /// Returns [`LoginValidationError`] for a blank username or empty password.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as submitted.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// The configured administrator: a username plus the SHA-256 digest of the
/// password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    username: String,
    password_sha256: String,
}

/// Error raised when the configured account is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminAccountError {
    /// The username is blank.
    #[error("admin username must not be empty")]
    EmptyUsername,
    /// The digest is not 64 hex characters.
    #[error("admin password digest must be 64 hex characters")]
    MalformedDigest,
}

impl AdminAccount {
    /// Build an account from a username and a hex password digest.
    ///
    /// # Errors
    ///
    /// Returns [`AdminAccountError`] for a blank username or a digest that
    /// is not 64 hex characters.
    pub fn new(
        username: impl Into<String>,
        password_sha256: impl Into<String>,
    ) -> Result<Self, AdminAccountError> {
        let username = username.into().trim().to_owned();
        if username.is_empty() {
            return Err(AdminAccountError::EmptyUsername);
        }
        let digest = password_sha256.into().trim().to_ascii_lowercase();
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AdminAccountError::MalformedDigest);
        }
        Ok(Self {
            username,
            password_sha256: digest,
        })
    }

    /// Build an account from a plaintext password. Used by tooling and tests.
    pub fn with_password(
        username: impl Into<String>,
        password: &str,
    ) -> Result<Self, AdminAccountError> {
        Self::new(username, sha256_hex(password.as_bytes()))
    }

    /// Configured login name.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Whether `credentials` identify this account.
    pub fn verify(&self, credentials: &AdminCredentials) -> bool {
        let presented = sha256_hex(credentials.password().as_bytes());
        credentials.username() == self.username && presented == self.password_sha256
    }
}

/// Opaque bearer token handed to the admin client after login.
///
/// Only [`AdminSessionToken::digest`] is ever persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSessionToken(Zeroizing<String>);

impl AdminSessionToken {
    /// Mint 32 random bytes from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; 32]);
        OsRng.fill_bytes(&mut bytes[..]);
        Self(Zeroizing::new(hex::encode(&bytes[..])))
    }

    /// Wrap a token presented by a client. Returns `None` when blank.
    pub fn from_presented(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Raw token value, for the session cookie only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Storage key for this token.
    pub fn digest(&self) -> String {
        sha256_hex(self.0.as_bytes())
    }
}

impl fmt::Debug for AdminSessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSessionToken(..)")
    }
}

/// A stored admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    /// SHA-256 digest of the session token.
    pub token_digest: String,
    /// Administrator the session belongs to.
    pub username: String,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
    /// When the session lapses.
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Whether the session has lapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Proof that the caller presented a live admin session.
///
/// Only the admin auth service can mint one, so holding a capability means
/// authorisation has already happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCapability {
    username: String,
}

impl AdminCapability {
    pub(crate) fn granted_to(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Administrator the capability was granted to.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}
