use std::env;

use auth::ConfigurationError;
use auth::TokenConfig;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub jwt: JwtConfig,
}

/// Token settings as read from configuration sources.
///
/// `secret` has no default. `issuer` and `audience` fall back to
/// `user-service`, which deployments are expected to override.
#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: Option<String>,
    pub issuer: String,
    pub audience: String,
    pub expiration_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

impl Config {
    pub const DEFAULT_ISSUER: &'static str = "user-service";
    pub const DEFAULT_AUDIENCE: &'static str = "user-service";

    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, JWT__ISSUER, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults for everything except the secret
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = Self::defaults()?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        configuration.try_deserialize()
    }

    /// Builder pre-populated with the built-in defaults.
    pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("jwt.issuer", Self::DEFAULT_ISSUER)?
            .set_default("jwt.audience", Self::DEFAULT_AUDIENCE)?
            .set_default("jwt.expiration_hours", auth::config::DEFAULT_TTL_HOURS)
    }

    /// Validate the token settings, failing fast on a missing or weak secret.
    ///
    /// # Errors
    /// * `ConfigurationError` - Secret, issuer, audience or lifetime rejected
    pub fn token_config(&self) -> Result<TokenConfig, ConfigurationError> {
        let secret = self
            .jwt
            .secret
            .as_deref()
            .ok_or(ConfigurationError::MissingSecret)?;
        let ttl = chrono::Duration::try_hours(self.jwt.expiration_hours)
            .ok_or(ConfigurationError::InvalidTtl)?;

        TokenConfig::new(
            secret,
            self.jwt.issuer.as_str(),
            self.jwt.audience.as_str(),
            ttl,
        )
    }
}
