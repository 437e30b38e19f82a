use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;
use crate::role::Role;

/// Verified user identity handed to the token authority for issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}

/// Signed claim set carried by every token.
///
/// Registered claims use their RFC 7519 names; `name`, `email` and `role`
/// are private claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (decimal user id)
    pub sub: String,

    /// Display name
    pub name: String,

    pub email: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,
}

impl Claims {
    /// Create claims for an identity, starting now.
    ///
    /// # Arguments
    /// * `identity` - User identity to embed
    /// * `issuer` - Issuer claim value
    /// * `audience` - Audience claim value
    /// * `ttl` - Time until the token expires
    ///
    /// # Returns
    /// Claims with `iat` = now and `exp` = now + `ttl`
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry falls outside the representable range
    pub fn for_identity(
        identity: &Identity,
        issuer: &str,
        audience: &str,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        Self::for_identity_at(identity, issuer, audience, ttl, Utc::now())
    }

    pub(crate) fn for_identity_at(
        identity: &Identity,
        issuer: &str,
        audience: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, TokenError> {
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::EncodingFailed("expiry out of range".to_string()))?;

        Ok(Self {
            sub: identity.id.to_string(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
        })
    }

    /// Parse the subject back into the numeric user id.
    ///
    /// # Errors
    /// * `InvalidClaims` - Subject is not a decimal integer
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidClaims("subject is not a user id".to_string()))
    }

    /// Project the claims back into an identity.
    pub fn identity(&self) -> Result<Identity, TokenError> {
        Ok(Identity {
            id: self.user_id()?,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::new(7, "alice", "alice@example.com", Role::Admin)
    }

    #[test]
    fn test_for_identity() {
        let claims = Claims::for_identity(&alice(), "issuer", "audience", Duration::hours(24))
            .unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "issuer");
        assert_eq!(claims.aud, "audience");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_identity_roundtrip() {
        let claims = Claims::for_identity(&alice(), "issuer", "audience", Duration::hours(1))
            .unwrap();
        assert_eq!(claims.identity().unwrap(), alice());
    }

    #[test]
    fn test_user_id_rejects_non_numeric_subject() {
        let mut claims =
            Claims::for_identity(&alice(), "issuer", "audience", Duration::hours(1)).unwrap();
        claims.sub = "user123".to_string();

        assert!(matches!(claims.user_id(), Err(TokenError::InvalidClaims(_))));
    }

    #[test]
    fn test_is_expired() {
        let now = DateTime::from_timestamp(1_000, 0).unwrap();
        let claims = Claims::for_identity_at(&alice(), "i", "a", Duration::seconds(0), now)
            .unwrap();

        assert!(!claims.is_expired(999));
        assert!(!claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        let result =
            Claims::for_identity(&alice(), "issuer", "audience", Duration::weeks(1_000_000_000));

        assert!(matches!(result, Err(TokenError::EncodingFailed(_))));
    }

    #[test]
    fn test_wire_claim_names() {
        let claims = Claims::for_identity(&alice(), "issuer", "audience", Duration::hours(1))
            .unwrap();
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["sub"], "7");
        assert_eq!(value["name"], "alice");
        assert_eq!(value["role"], "admin");
        assert!(value["iat"].is_i64());
        assert!(value["exp"].is_i64());
    }
}
