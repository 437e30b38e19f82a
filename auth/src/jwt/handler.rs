use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::Identity;
use super::errors::TokenError;
use crate::config::TokenConfig;

/// JWT token handler for issuing and validating tokens.
///
/// Signs with HS512 and binds every token to the configured issuer and
/// audience. Holds no per-token state: validity is recomputed from the
/// token itself on every call, so there is no revocation before expiry.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    config: TokenConfig,
}

impl JwtHandler {
    /// Create a new JWT handler from validated configuration.
    ///
    /// # Arguments
    /// * `config` - Signing secret, issuer, audience and lifetime
    ///
    /// # Returns
    /// JwtHandler instance configured with HS512 algorithm
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret()),
            decoding_key: DecodingKey::from_secret(config.secret()),
            algorithm: Algorithm::HS512,
            config,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Build the claim set for an identity using the configured issuer,
    /// audience and lifetime.
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry falls outside the representable range
    pub fn claims_for(&self, identity: &Identity) -> Result<Claims, TokenError> {
        Claims::for_identity(
            identity,
            self.config.issuer(),
            self.config.audience(),
            self.config.ttl(),
        )
    }

    /// Issue a signed token for an identity.
    ///
    /// # Arguments
    /// * `identity` - Verified user identity
    ///
    /// # Returns
    /// Compact JWT string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.encode(&self.claims_for(identity)?)
    }

    /// Sign an explicit claim set.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a token and return its claims.
    ///
    /// Checks, in order: structure, algorithm and signature, expiry (no
    /// leeway), issuer, audience, and that the subject is a user id.
    ///
    /// # Arguments
    /// * `token` - JWT token string to validate
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Malformed` - Token is not a well-formed JWT
    /// * `InvalidSignature` - Signature or algorithm does not match
    /// * `TokenExpired` - Current time is past `exp`
    /// * `InvalidClaims` - Issuer, audience or subject rejected
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[self.config.audience()]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        token_data.claims.user_id()?;

        Ok(token_data.claims)
    }

    /// Decode token without validation (for inspection only).
    ///
    /// # Errors
    /// * `Malformed` - Token format is invalid
    ///
    /// # Security Warning
    /// This does NOT validate the signature, expiry, issuer or audience.
    /// Never trust claims from this method for authorization decisions.
    pub fn decode_unverified(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.insecure_disable_signature_validation();
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        Ok(token_data.claims)
    }
}
