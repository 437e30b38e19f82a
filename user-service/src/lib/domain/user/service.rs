use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;
use auth::Role;
use chrono::Utc;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Credential hashing and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    fn require_role(claims: &Claims, role: Role) -> Result<(), UserError> {
        if claims.role == role {
            Ok(())
        } else {
            Err(UserError::Forbidden(role))
        }
    }

    fn session_for(&self, user: User) -> Result<AuthenticatedSession, UserError> {
        let result = self.authenticator.issue_session(&user.identity())?;

        Ok(AuthenticatedSession {
            user,
            token: result.access_token,
            expires_at: result.expires_at,
        })
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(
        &self,
        command: RegisterUserCommand,
    ) -> Result<AuthenticatedSession, UserError> {
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(UserError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let credential = self
            .authenticator
            .hash_password(command.password.expose())?;

        let new_user = NewUser {
            username: command.username,
            email: command.email,
            credential,
            active: true,
            role: Role::User,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(new_user).await?;
        tracing::info!(user_id = %created_user.id, role = %created_user.role, "User registered");

        self.session_for(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthenticatedSession, UserError> {
        let username =
            Username::new(command.username).map_err(|_| UserError::InvalidCredentials)?;

        let Some(user) = self.repository.find_by_username(&username).await? else {
            // Same verification cost as a wrong password, so timing does
            // not reveal which usernames exist.
            self.authenticator.reject_unknown(&command.password);
            return Err(UserError::InvalidCredentials);
        };

        let result = self
            .authenticator
            .authenticate(&command.password, &user.credential, &user.identity())
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
                AuthenticationError::PasswordError(err) => UserError::Password(err),
                AuthenticationError::TokenError(err) => UserError::Token(err),
            });

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::info!(user_id = %user.id, "Login rejected");
                return Err(e);
            }
        };

        // Checked after the password so the account state is not revealed
        // to someone who does not know it.
        if !user.active {
            tracing::info!(user_id = %user.id, "Login rejected for disabled account");
            return Err(UserError::AccountDisabled);
        }

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(AuthenticatedSession {
            user,
            token: result.access_token,
            expires_at: result.expires_at,
        })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn current_user(&self, claims: &Claims) -> Result<User, UserError> {
        let id = UserId(claims.user_id()?);
        self.get_user(&id).await
    }

    async fn list_users(&self, claims: &Claims) -> Result<Vec<User>, UserError> {
        Self::require_role(claims, Role::Admin)?;
        self.repository.list_all().await
    }

    async fn change_password(
        &self,
        id: &UserId,
        current_password: &str,
        new_password: Password,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(id).await?;

        if !self
            .authenticator
            .verify_password(current_password, &user.credential)
        {
            return Err(UserError::InvalidCredentials);
        }

        user.credential = self.authenticator.hash_password(new_password.expose())?;

        let updated_user = self.repository.update(user).await?;
        tracing::info!(user_id = %updated_user.id, "Password changed");

        Ok(updated_user)
    }

    async fn set_active(
        &self,
        claims: &Claims,
        id: &UserId,
        active: bool,
    ) -> Result<User, UserError> {
        Self::require_role(claims, Role::Admin)?;

        let mut user = self.get_user(id).await?;
        user.active = active;

        let updated_user = self.repository.update(user).await?;
        if active {
            tracing::info!(user_id = %updated_user.id, "Account activated");
        } else {
            tracing::warn!(
                user_id = %updated_user.id,
                "Account deactivated; tokens already issued stay valid until expiry"
            );
        }

        Ok(updated_user)
    }

    async fn delete_account(&self, claims: &Claims) -> Result<(), UserError> {
        let id = UserId(claims.user_id()?);
        self.repository.delete(&id).await?;

        tracing::info!(user_id = %id, "Account deleted");

        Ok(())
    }
}
