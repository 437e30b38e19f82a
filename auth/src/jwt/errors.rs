use thiserror::Error;

/// Error type for token operations.
///
/// Distinguishes failure kinds for logging and tests. Callers facing an end
/// client should collapse every validation variant into one "unauthorized"
/// answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token claims are invalid: {0}")]
    InvalidClaims(String),

    #[error("Token is expired")]
    TokenExpired,
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::TokenExpired)
    }

    /// Short stable label for structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::EncodingFailed(_) => "encoding_failed",
            TokenError::Malformed(_) => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidClaims(_) => "invalid_claims",
            TokenError::TokenExpired => "expired",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            ErrorKind::InvalidIssuer => TokenError::InvalidClaims("issuer mismatch".to_string()),
            ErrorKind::InvalidAudience => {
                TokenError::InvalidClaims("audience mismatch".to_string())
            }
            ErrorKind::InvalidSubject => TokenError::InvalidClaims("invalid subject".to_string()),
            ErrorKind::ImmatureSignature => {
                TokenError::InvalidClaims("token not yet valid".to_string())
            }
            ErrorKind::MissingRequiredClaim(claim) => {
                TokenError::InvalidClaims(format!("missing claim: {}", claim))
            }
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}
