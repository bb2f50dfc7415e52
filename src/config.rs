//! Application configuration module
//! Handles environment variable loading, configuration validation, and application settings

use crate::chains::stellar::config::StellarConfig;
use crate::chains::stellar::keys::{AdminKeypair, AdminSecret};
use crate::chains::stellar::types::is_valid_stellar_address;
use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub stellar: StellarConfig,
    pub admin: AdminConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

/// Administrative account credentials. Either half may be absent at startup;
/// the request that needs it fails with a configuration error instead.
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    pub public_address: Option<String>,
    pub secret: Option<AdminSecret>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            stellar: StellarConfig::from_env()?,
            admin: AdminConfig::from_env(),
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logging.validate()?;
        self.stellar.validate()?;
        self.admin.validate()?;

        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        AdminConfig {
            public_address: non_empty_var("ADMIN_STELLAR_PUBLIC"),
            secret: non_empty_var("ADMIN_STELLAR_SECRET").map(AdminSecret::new),
        }
    }

    /// A present-but-malformed secret is a deployment error and stops startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(address) = &self.public_address {
            if !is_valid_stellar_address(address) {
                return Err(ConfigError::InvalidValue(
                    "ADMIN_STELLAR_PUBLIC is not a valid Stellar address".to_string(),
                ));
            }
        }

        if let Some(secret) = &self.secret {
            AdminKeypair::from_secret(secret).map_err(|_| {
                ConfigError::InvalidValue("ADMIN_STELLAR_SECRET is malformed".to_string())
            })?;
        }

        Ok(())
    }

    /// Address whose balance GET reports.
    pub fn public_address(&self) -> Option<&str> {
        self.public_address.as_deref()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),
}
