//! Process configuration, read once at startup from the environment.

use core::str::FromStr;
use std::net::SocketAddr;

use thiserror::Error;

use gatehouse_core::{SecretError, SigningSecret};
use gatehouse_observability::LogFormat;

pub const ENV_ENVIRONMENT: &str = "GATEHOUSE_ENV";
pub const ENV_SESSION_SECRET: &str = "GATEHOUSE_SESSION_SECRET";
pub const ENV_BIND_ADDR: &str = "GATEHOUSE_BIND_ADDR";
pub const ENV_LOG_FORMAT: &str = "GATEHOUSE_LOG_FORMAT";
pub const ENV_ADMIN_EMAIL: &str = "GATEHOUSE_ADMIN_EMAIL";
pub const ENV_ADMIN_PASSWORD: &str = "GATEHOUSE_ADMIN_PASSWORD";
pub const ENV_ADMIN_NAME: &str = "GATEHOUSE_ADMIN_NAME";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Deployment posture. Production turns on `Secure` cookies and refuses
/// weak session secrets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("{ENV_SESSION_SECRET} must be set in production")]
    MissingSecret,

    #[error("unusable session secret: {0}")]
    WeakSecret(#[from] SecretError),

    #[error("{ENV_ADMIN_EMAIL} and {ENV_ADMIN_PASSWORD} must be set together")]
    PartialAdmin,
}

/// Single account the built-in credential check accepts.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    pub session_secret: SigningSecret,
    pub log_format: LogFormat,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get(ENV_ENVIRONMENT) {
            Some(raw) => raw.parse::<Environment>().map_err(|message| ConfigError::Invalid {
                key: ENV_ENVIRONMENT,
                message,
            })?,
            None => Environment::default(),
        };

        let bind_addr = get(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: ENV_BIND_ADDR,
                message: e.to_string(),
            })?;

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|message| ConfigError::Invalid {
                key: ENV_LOG_FORMAT,
                message,
            })?,
            None => LogFormat::default(),
        };

        let session_secret = match get(ENV_SESSION_SECRET) {
            Some(raw) => SigningSecret::new(raw)?,
            None if environment.is_production() => return Err(ConfigError::MissingSecret),
            None => SigningSecret::dev_fallback(),
        };
        if environment.is_production() {
            session_secret.ensure_production_grade()?;
        }

        let bootstrap_admin = match (get(ENV_ADMIN_EMAIL), get(ENV_ADMIN_PASSWORD)) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                display_name: get(ENV_ADMIN_NAME).unwrap_or_else(|| "Administrator".to_string()),
                email,
                password,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialAdmin),
        };

        Ok(Self {
            environment,
            bind_addr,
            session_secret,
            log_format,
            bootstrap_admin,
        })
    }

    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }
}
