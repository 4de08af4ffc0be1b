use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const SESSION_KEY_VAR: &str = "CVEDB_SESSION_KEY";
pub const SESSION_COOKIE_NAME: &str = "cvedbSession";
pub const SESSION_MAX_AGE: Duration = Duration::from_millis(1000 * 60 * 60 * 24);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Environment::Development => "cvedb_web=debug,tower_http=debug,info",
            Environment::Staging => "cvedb_web=debug,info",
            Environment::Production => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Fixed options for the session cookie middleware.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secret: SessionSecret,
    pub max_age: Duration,
}

impl SessionConfig {
    pub fn new(secret: SessionSecret) -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            secret,
            max_age: SESSION_MAX_AGE,
        }
    }

    /// `Max-Age` directive value, in whole seconds
    pub fn max_age_secs(&self) -> u64 {
        self.max_age.as_secs()
    }
}

/// HMAC key for session cookies. Never empty.
#[derive(Clone)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySessionKey(SESSION_KEY_VAR));
        }
        Ok(Self(secret.into_bytes()))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let value = env::var(SESSION_KEY_VAR)
            .map_err(|_| ConfigError::MissingSessionKey(SESSION_KEY_VAR))?;
        Self::new(value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(<redacted>)")
    }
}

impl AppConfig {
    /// Read configuration from the process environment. Called once at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let secret = SessionSecret::from_env()?;

        let config = match environment {
            Environment::Production => Self::production(secret),
            Environment::Staging => Self::staging(secret),
            Environment::Development => Self::development(secret),
        };
        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        let port = env::var("CVEDB_WEB_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok());
        if let Some(v) = port {
            self.server.port = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(v.clone()))?;
        }
        Ok(self)
    }

    fn development(secret: SessionSecret) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            session: SessionConfig::new(secret),
        }
    }

    fn staging(secret: SessionSecret) -> Self {
        Self {
            environment: Environment::Staging,
            ..Self::development(secret)
        }
    }

    fn production(secret: SessionSecret) -> Self {
        Self {
            environment: Environment::Production,
            ..Self::development(secret)
        }
    }
}
