use chrono::DateTime;
use chrono::Utc;

use crate::config::TokenConfig;
use crate::jwt::Claims;
use crate::jwt::Identity;
use crate::jwt::JwtHandler;
use crate::jwt::TokenError;
use crate::password::Credential;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Stateless apart from the read-only token configuration, so a single
/// instance can be shared across request tasks behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    decoy: Credential,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,

    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `config` - Validated token configuration
    pub fn new(config: TokenConfig) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(config),
            decoy: Credential::decoy(),
        }
    }

    pub fn token_config(&self) -> &TokenConfig {
        self.jwt_handler.config()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Password is empty or hashing failed
    pub fn hash_password(&self, password: &str) -> Result<Credential, PasswordError> {
        self.password_hasher.hash(password)
    }

    pub fn verify_password(&self, password: &str, credential: &Credential) -> bool {
        self.password_hasher.verify(password, credential)
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `credential` - Stored hash and salt
    /// * `identity` - Identity to encode in the token
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        credential: &Credential,
        identity: &Identity,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, credential) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_session(identity)?)
    }

    /// Reject a login for an account that does not exist.
    ///
    /// Runs a full verification against a decoy credential first, so the
    /// rejection takes as long as a wrong password on a real account.
    pub fn reject_unknown(&self, password: &str) -> AuthenticationError {
        let _ = self.password_hasher.verify(password, &self.decoy);
        AuthenticationError::InvalidCredentials
    }

    /// Generate a token without password verification.
    ///
    /// Used right after registration, when the credential was created in
    /// the same request.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn issue_session(&self, identity: &Identity) -> Result<AuthenticationResult, TokenError> {
        let claims = self.jwt_handler.claims_for(identity)?;
        let access_token = self.jwt_handler.encode(&claims)?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| TokenError::EncodingFailed("expiry out of range".to_string()))?;

        tracing::debug!(
            user_id = identity.id,
            role = %identity.role,
            expires_at = %expires_at,
            "Access token issued"
        );

        Ok(AuthenticationResult {
            access_token,
            expires_at,
        })
    }

    /// Issue a bare token string for an identity.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn issue_token(&self, identity: &Identity) -> Result<String, TokenError> {
        self.jwt_handler.issue(identity)
    }

    /// Validate and decode JWT token.
    ///
    /// # Errors
    /// * `TokenError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.jwt_handler.validate(token)
    }
}
