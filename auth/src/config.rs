use std::fmt;

use chrono::Duration;
use chrono::Utc;
use thiserror::Error;

/// Token lifetime used when none is configured.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Startup configuration failures.
///
/// Raised once while building [`TokenConfig`]; a process that hits one of
/// these should refuse to start.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Token signing secret too short: minimum {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    #[error("Token issuer is not configured")]
    MissingIssuer,

    #[error("Token audience is not configured")]
    MissingAudience,

    #[error("Token lifetime must be positive and within the representable date range")]
    InvalidTtl,
}

/// Validated signing and claim settings for the token authority.
///
/// Read-only after construction. The secret is never exposed through
/// `Debug`.
#[derive(Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenConfig {
    /// Build a validated token configuration.
    ///
    /// # Arguments
    /// * `secret` - HMAC signing secret (at least 32 bytes)
    /// * `issuer` - Value written to and expected in the `iss` claim
    /// * `audience` - Value written to and expected in the `aud` claim
    /// * `ttl` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `MissingSecret` / `SecretTooShort` - Secret absent or weak
    /// * `MissingIssuer` / `MissingAudience` - Blank claim values
    /// * `InvalidTtl` - Zero, negative or out-of-range lifetime
    pub fn new(
        secret: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, ConfigurationError> {
        let secret = secret.into();
        let issuer = issuer.into();
        let audience = audience.into();

        if secret.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigurationError::SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }
        if issuer.trim().is_empty() {
            return Err(ConfigurationError::MissingIssuer);
        }
        if audience.trim().is_empty() {
            return Err(ConfigurationError::MissingAudience);
        }
        validate_ttl(ttl)?;

        Ok(Self {
            secret,
            issuer,
            audience,
            ttl,
        })
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Same configuration with a different token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Result<Self, ConfigurationError> {
        validate_ttl(ttl)?;
        self.ttl = ttl;
        Ok(self)
    }
}

// A lifetime must leave `now + ttl` representable, or every issuance fails.
fn validate_ttl(ttl: Duration) -> Result<(), ConfigurationError> {
    if ttl <= Duration::zero() || Utc::now().checked_add_signed(ttl).is_none() {
        return Err(ConfigurationError::InvalidTtl);
    }
    Ok(())
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}
