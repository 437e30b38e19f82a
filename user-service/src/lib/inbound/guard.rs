use std::sync::Arc;

use auth::Authenticator;
use auth::Claims;
use auth::Role;
use thiserror::Error;

use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Errors surfaced to an end client.
///
/// Messages are fixed: the specific reason a credential was rejected is
/// logged but never returned.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Conflict")]
    Conflict,

    #[error("Invalid request")]
    InvalidRequest,

    #[error("Internal error")]
    Internal,
}

impl From<UserError> for AccessError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidCredentials | UserError::AccountDisabled | UserError::Token(_) => {
                AccessError::Unauthorized
            }
            UserError::Forbidden(_) => AccessError::Forbidden,
            UserError::NotFound(_) | UserError::NotFoundByUsername(_) => AccessError::NotFound,
            UserError::UsernameAlreadyExists(_) | UserError::EmailAlreadyExists(_) => {
                AccessError::Conflict
            }
            UserError::InvalidUserId(_)
            | UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidRole(_) => AccessError::InvalidRequest,
            UserError::Password(_) | UserError::DatabaseError(_) | UserError::Unknown(_) => {
                tracing::error!(error = %err, "Request failed");
                AccessError::Internal
            }
        }
    }
}

/// Principal resolved from a validated bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub claims: Claims,
}

/// Turns a presented `Authorization` header into an authenticated principal.
#[derive(Clone)]
pub struct AuthGuard {
    authenticator: Arc<Authenticator>,
}

impl AuthGuard {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }

    /// Validate a bearer credential.
    ///
    /// # Arguments
    /// * `authorization` - Raw `Authorization` header value, if any
    ///
    /// # Errors
    /// * `Unauthorized` - For every failure: missing or malformed header,
    ///   bad signature, wrong issuer or audience, expired token
    pub fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticatedUser, AccessError> {
        let token = extract_bearer_token(authorization)?;

        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(reason = e.reason(), "JWT validation failed");
            AccessError::Unauthorized
        })?;

        let user_id = claims.user_id().map(UserId).map_err(|e| {
            tracing::warn!(reason = e.reason(), "Token subject is not a user id");
            AccessError::Unauthorized
        })?;

        Ok(AuthenticatedUser {
            user_id,
            username: claims.name.clone(),
            role: claims.role,
            claims,
        })
    }

    /// Gate an operation on an exact role.
    ///
    /// # Errors
    /// * `Forbidden` - Principal holds a different role
    pub fn require_role(&self, user: &AuthenticatedUser, role: Role) -> Result<(), AccessError> {
        if user.role == role {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %user.user_id,
                role = %user.role,
                required = %role,
                "Access denied"
            );
            Err(AccessError::Forbidden)
        }
    }
}

fn extract_bearer_token(authorization: Option<&str>) -> Result<&str, AccessError> {
    let header = authorization.ok_or_else(|| {
        tracing::warn!(reason = "missing_header", "Authorization header missing");
        AccessError::Unauthorized
    })?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!(reason = "bad_scheme", "Authorization header is not a bearer token");
        AccessError::Unauthorized
    })?;

    let token = token.trim();
    if token.is_empty() {
        tracing::warn!(reason = "empty_token", "Bearer token is empty");
        return Err(AccessError::Unauthorized);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use auth::Identity;
    use auth::TokenConfig;
    use chrono::Duration;

    use super::*;

    const SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn authenticator(secret: &str, audience: &str) -> Arc<Authenticator> {
        Arc::new(Authenticator::new(
            TokenConfig::new(secret, "user-service", audience, Duration::hours(1)).unwrap(),
        ))
    }

    fn guard() -> AuthGuard {
        AuthGuard::new(authenticator(SECRET, "user-service"))
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn test_authenticate_valid_token() {
        let auth = authenticator(SECRET, "user-service");
        let token = auth
            .issue_token(&Identity::new(7, "alice", "alice@example.com", Role::Admin))
            .unwrap();

        let user = AuthGuard::new(auth)
            .authenticate(Some(&bearer(&token)))
            .expect("valid token");

        assert_eq!(user.user_id, UserId(7));
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_header_problems_are_unauthorized() {
        let guard = guard();

        assert_eq!(guard.authenticate(None).unwrap_err(), AccessError::Unauthorized);
        assert_eq!(
            guard.authenticate(Some("Basic abc")).unwrap_err(),
            AccessError::Unauthorized
        );
        assert_eq!(
            guard.authenticate(Some("Bearer ")).unwrap_err(),
            AccessError::Unauthorized
        );
        assert_eq!(
            guard.authenticate(Some("Bearer not.a.jwt")).unwrap_err(),
            AccessError::Unauthorized
        );
    }

    #[test]
    fn test_all_validation_failures_collapse() {
        let identity = Identity::new(7, "alice", "alice@example.com", Role::User);
        let guard = guard();

        let foreign_secret =
            authenticator("another-secret-key-that-is-32-bytes-long", "user-service")
                .issue_token(&identity)
                .unwrap();
        let foreign_audience = authenticator(SECRET, "somewhere-else")
            .issue_token(&identity)
            .unwrap();

        let signature = guard.authenticate(Some(&bearer(&foreign_secret))).unwrap_err();
        let audience = guard.authenticate(Some(&bearer(&foreign_audience))).unwrap_err();

        assert_eq!(signature, AccessError::Unauthorized);
        assert_eq!(audience, AccessError::Unauthorized);
        assert_eq!(signature.to_string(), audience.to_string());
    }

    #[test]
    fn test_require_role() {
        let auth = authenticator(SECRET, "user-service");
        let token = auth
            .issue_token(&Identity::new(2, "bob", "bob@example.com", Role::User))
            .unwrap();
        let guard = AuthGuard::new(auth);
        let bob = guard.authenticate(Some(&bearer(&token))).unwrap();

        assert!(guard.require_role(&bob, Role::User).is_ok());
        assert_eq!(
            guard.require_role(&bob, Role::Admin).unwrap_err(),
            AccessError::Forbidden
        );
    }

    #[test]
    fn test_user_error_mapping_hides_detail() {
        let err = AccessError::from(UserError::DatabaseError(
            "connection refused at 10.0.0.5".to_string(),
        ));
        assert_eq!(err, AccessError::Internal);
        assert_eq!(err.to_string(), "Internal error");

        assert_eq!(
            AccessError::from(UserError::AccountDisabled),
            AccessError::Unauthorized
        );
        assert_eq!(
            AccessError::from(UserError::Token(auth::TokenError::TokenExpired)),
            AccessError::Unauthorized
        );
    }
}
