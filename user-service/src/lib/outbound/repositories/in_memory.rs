use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Assigns monotonically increasing ids starting at 1 and enforces
/// case-insensitive uniqueness of usernames and emails, like a relational
/// store with unique indexes on the folded columns would.
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<UserId, User>,
}

impl State {
    fn check_unique(
        &self,
        username: &Username,
        email: &EmailAddress,
        except: Option<UserId>,
    ) -> Result<(), UserError> {
        for user in self.users.values() {
            if Some(user.id) == except {
                continue;
            }
            if user.username.matches(username) {
                return Err(UserError::UsernameAlreadyExists(username.to_string()));
            }
            if user.email.normalized() == email.normalized() {
                return Err(UserError::EmailAlreadyExists(email.as_str().to_string()));
            }
        }
        Ok(())
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut state = self.state.write().await;
        state.check_unique(&user.username, &user.email, None)?;

        state.next_id += 1;
        let created = User {
            id: UserId(state.next_id),
            username: user.username,
            email: user.email,
            credential: user.credential,
            active: user.active,
            role: user.role,
            created_at: user.created_at,
        };
        state.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.username.matches(username))
            .cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let wanted = email.normalized();
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.email.normalized() == wanted)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        state.check_unique(&user.username, &user.email, Some(user.id))?;
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.state
            .write()
            .await
            .users
            .remove(id)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }
}
