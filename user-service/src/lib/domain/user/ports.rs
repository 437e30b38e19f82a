use async_trait::async_trait;
use auth::Claims;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account and issue its first token.
    ///
    /// # Arguments
    /// * `command` - Validated username, email, and password
    ///
    /// # Returns
    /// Created user with an access token
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is taken (case-insensitive)
    /// * `EmailAlreadyExists` - Email is registered (case-insensitive)
    /// * `DatabaseError` - Storage operation failed
    async fn register(&self, command: RegisterUserCommand)
        -> Result<AuthenticatedSession, UserError>;

    /// Verify a username/password pair and issue a token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `AccountDisabled` - Account exists but is inactive
    async fn login(&self, command: LoginCommand) -> Result<AuthenticatedSession, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Resolve the account a validated token belongs to.
    ///
    /// # Errors
    /// * `Token` - Subject is not a user id
    /// * `NotFound` - Account no longer exists
    async fn current_user(&self, claims: &Claims) -> Result<User, UserError>;

    /// List every account. Admin only.
    ///
    /// # Errors
    /// * `Forbidden` - Caller is not an admin
    async fn list_users(&self, claims: &Claims) -> Result<Vec<User>, UserError>;

    /// Replace the caller's password after checking the current one.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Current password does not match
    /// * `NotFound` - User does not exist
    async fn change_password(
        &self,
        id: &UserId,
        current_password: &str,
        new_password: Password,
    ) -> Result<User, UserError>;

    /// Activate or deactivate an account. Admin only.
    ///
    /// Tokens already issued to the account stay valid until they expire.
    ///
    /// # Errors
    /// * `Forbidden` - Caller is not an admin
    /// * `NotFound` - User does not exist
    async fn set_active(&self, claims: &Claims, id: &UserId, active: bool)
        -> Result<User, UserError>;

    /// Delete the caller's own account.
    ///
    /// # Errors
    /// * `NotFound` - Account no longer exists
    async fn delete_account(&self, claims: &Claims) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage, assigning its id.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username, ignoring case.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address, ignoring case.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `EmailAlreadyExists` - New email is already registered
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}
