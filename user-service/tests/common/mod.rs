use std::sync::Arc;

use auth::Authenticator;
use auth::TokenConfig;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::models::NewUser;
use user_service::domain::user::models::Password;
use user_service::domain::user::models::RegisterUserCommand;
use user_service::domain::user::models::User;
use user_service::domain::user::models::Username;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::guard::AuthGuard;
use user_service::repositories::InMemoryUserRepository;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Service wired against the in-memory store
pub struct TestApp {
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
    pub user_service: UserService<InMemoryUserRepository>,
    pub guard: AuthGuard,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_ttl(chrono::Duration::hours(24))
    }

    pub fn with_ttl(ttl: chrono::Duration) -> Self {
        let config = TokenConfig::new(TEST_SECRET, "user-service", "user-service", ttl)
            .expect("Invalid test token config");

        let repository = Arc::new(InMemoryUserRepository::new());
        let authenticator = Arc::new(Authenticator::new(config));
        let user_service = UserService::new(Arc::clone(&repository), Arc::clone(&authenticator));
        let guard = AuthGuard::new(Arc::clone(&authenticator));

        Self {
            repository,
            authenticator,
            user_service,
            guard,
        }
    }

    /// Insert an admin directly into storage, as an operator would.
    pub async fn seed_admin(&self, username: &str, password: &str) -> User {
        let credential = self
            .authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        self.repository
            .create(NewUser {
                username: Username::new(username.to_string()).unwrap(),
                email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
                credential,
                active: true,
                role: auth::Role::Admin,
                created_at: chrono::Utc::now(),
            })
            .await
            .expect("Failed to seed admin")
    }
}

pub fn register_command(username: &str, email: &str, password: &str) -> RegisterUserCommand {
    RegisterUserCommand::new(
        Username::new(username.to_string()).unwrap(),
        EmailAddress::new(email.to_string()).unwrap(),
        Password::new(password.to_string()).unwrap(),
    )
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
