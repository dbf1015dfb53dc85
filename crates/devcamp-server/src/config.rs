//! Configuration management

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/devcamp";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default session token lifetime in days.
pub const DEFAULT_JWT_EXPIRE_DAYS: i64 = 30;

/// Default session cookie lifetime in days.
pub const DEFAULT_JWT_COOKIE_EXPIRE_DAYS: i64 = 30;

/// Default maximum photo upload size in bytes.
pub const DEFAULT_MAX_FILE_UPLOAD: usize = 1_000_000;

/// Default storage key prefix for uploaded photos.
pub const DEFAULT_FILE_UPLOAD_PREFIX: &str = "photos";

/// Default SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender display name.
pub const DEFAULT_FROM_NAME: &str = "DevCamp";

/// Default sender address.
pub const DEFAULT_FROM_EMAIL: &str = "noreply@devcamp.io";

/// Default MapQuest geocoding endpoint.
pub const DEFAULT_GEOCODER_URL: &str = "https://www.mapquestapi.com/geocoding/v1/address";

/// Default geocoder request timeout in seconds.
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub mail: MailConfig,
    pub geocoder: GeocoderConfig,
}

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => anyhow::bail!("Unknown environment '{}'", other),
        }
    }
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub environment: Environment,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Session token settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub cookie_expire_days: i64,
    /// Mark the session cookie `Secure`
    pub secure_cookie: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expire_days", &self.jwt_expire_days)
            .field("cookie_expire_days", &self.cookie_expire_days)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

/// Photo upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub key_prefix: String,
}

/// Outgoing mail settings; `smtp_host == None` selects the log-only mailer
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    #[serde(skip_serializing)]
    pub smtp_password: Option<String>,
    pub from_name: String,
    pub from_email: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("from_name", &self.from_name)
            .field("from_email", &self.from_email)
            .finish_non_exhaustive()
    }
}

/// Geocoding service settings
#[derive(Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeocoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderConfig")
            .field("url", &self.url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let environment = match env_opt("DEVCAMP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        let config = Config {
            server: ServerConfig {
                host: std::env::var("DEVCAMP_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("DEVCAMP_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "DEVCAMP_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
                environment,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
                min_connections: env_or(
                    "DATABASE_MIN_CONNECTIONS",
                    DEFAULT_DATABASE_MIN_CONNECTIONS,
                ),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                idle_timeout_secs: env_or(
                    "DATABASE_IDLE_TIMEOUT",
                    DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                ),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
            auth: AuthConfig {
                jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
                jwt_expire_days: env_or("JWT_EXPIRE_DAYS", DEFAULT_JWT_EXPIRE_DAYS),
                cookie_expire_days: env_or(
                    "JWT_COOKIE_EXPIRE_DAYS",
                    DEFAULT_JWT_COOKIE_EXPIRE_DAYS,
                ),
                secure_cookie: environment.is_production(),
            },
            upload: UploadConfig {
                max_file_size: env_or("MAX_FILE_UPLOAD", DEFAULT_MAX_FILE_UPLOAD),
                key_prefix: std::env::var("FILE_UPLOAD_PREFIX")
                    .unwrap_or_else(|_| DEFAULT_FILE_UPLOAD_PREFIX.to_string()),
            },
            mail: MailConfig {
                smtp_host: env_opt("SMTP_HOST"),
                smtp_port: env_or("SMTP_PORT", DEFAULT_SMTP_PORT),
                smtp_user: env_opt("SMTP_EMAIL"),
                smtp_password: env_opt("SMTP_PASSWORD"),
                from_name: std::env::var("FROM_NAME")
                    .unwrap_or_else(|_| DEFAULT_FROM_NAME.to_string()),
                from_email: std::env::var("FROM_EMAIL")
                    .unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string()),
            },
            geocoder: GeocoderConfig {
                url: std::env::var("GEOCODER_URL")
                    .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string()),
                api_key: std::env::var("GEOCODER_API_KEY").unwrap_or_default(),
                timeout_secs: env_or("GEOCODER_TIMEOUT_SECS", DEFAULT_GEOCODER_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must be set to a non-empty value");
        }

        if self.auth.jwt_expire_days <= 0 || self.auth.cookie_expire_days <= 0 {
            anyhow::bail!("Token and cookie lifetimes must be at least one day");
        }

        if self.upload.max_file_size == 0 {
            anyhow::bail!("MAX_FILE_UPLOAD must be greater than 0");
        }

        if self.geocoder.timeout_secs == 0 {
            anyhow::bail!("GEOCODER_TIMEOUT_SECS must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        if self.geocoder.api_key.is_empty() {
            tracing::warn!("GEOCODER_API_KEY is not set - bootcamp writes will fail to geocode");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                environment: Environment::Development,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_expire_days: DEFAULT_JWT_EXPIRE_DAYS,
                cookie_expire_days: DEFAULT_JWT_COOKIE_EXPIRE_DAYS,
                secure_cookie: false,
            },
            upload: UploadConfig {
                max_file_size: DEFAULT_MAX_FILE_UPLOAD,
                key_prefix: DEFAULT_FILE_UPLOAD_PREFIX.to_string(),
            },
            mail: MailConfig {
                smtp_host: None,
                smtp_port: DEFAULT_SMTP_PORT,
                smtp_user: None,
                smtp_password: None,
                from_name: DEFAULT_FROM_NAME.to_string(),
                from_email: DEFAULT_FROM_EMAIL.to_string(),
            },
            geocoder: GeocoderConfig {
                url: DEFAULT_GEOCODER_URL.to_string(),
                api_key: String::new(),
                timeout_secs: DEFAULT_GEOCODER_TIMEOUT_SECS,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.auth.jwt_secret = "test-secret".to_string();
        config
    }

    #[test]
    fn test_default_config_requires_secret() {
        assert!(Config::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_min_connections_above_max_rejected() {
        let mut config = valid();
        config.database.min_connections = 20;
        config.database.max_connections = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_connections"));
    }

    #[test]
    fn test_zero_upload_size_rejected() {
        let mut config = valid();
        config.upload.max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("PRODUCTION".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert!("staging".parse::<Environment>().is_err());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = valid();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
