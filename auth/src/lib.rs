//! Credential and session authority
//!
//! Provides reusable authentication infrastructure for services:
//! - Salted keyed password hashing (HMAC-SHA512, constant-time verification)
//! - Signed, time-bounded bearer tokens (HS512 JWT bound to issuer and audience)
//! - A closed set of authorization roles
//! - Authentication coordination
//!
//! Tokens are stateless: nothing is stored when they are issued, so a token
//! stays valid until it expires even if the account behind it is later
//! deactivated or deleted.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let credential = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &credential));
//! assert!(!hasher.verify("other_password", &credential));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, Identity, Role, TokenConfig};
//! use chrono::Duration;
//!
//! let config = TokenConfig::new(
//!     "secret_key_at_least_32_bytes_long!",
//!     "user-service",
//!     "user-service",
//!     Duration::hours(24),
//! )
//! .unwrap();
//! let auth = Authenticator::new(config);
//!
//! // Register: hash password
//! let credential = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let identity = Identity::new(7, "alice", "alice@example.com", Role::Admin);
//! let result = auth.authenticate("password123", &credential, &identity).unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.user_id().unwrap(), 7);
//! assert_eq!(claims.role, Role::Admin);
//! ```

pub mod authenticator;
pub mod config;
pub mod jwt;
pub mod password;
pub mod role;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use config::ConfigurationError;
pub use config::TokenConfig;
pub use jwt::Claims;
pub use jwt::Identity;
pub use jwt::JwtHandler;
pub use jwt::TokenError;
pub use password::Credential;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use role::Role;
pub use role::RoleError;
