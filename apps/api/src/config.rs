//! Order API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, once, at startup. A bad value is a startup error; requests
//! never discover missing configuration at runtime.

use std::env;

/// Order API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file path
    pub database_path: String,

    /// Shop-wide salt for ticket code hashing.
    /// In production this MUST be set via environment variable.
    pub ticket_salt: String,

    /// Sender address stamped onto invoice emails
    pub invoice_from: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("QBU_HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("QBU_HTTP_PORT".to_string()))?,

            database_path: env::var("QBU_DATABASE_PATH").unwrap_or_else(|_| "qbu.db".to_string()),

            ticket_salt: env::var("QBU_TICKET_SALT")
                .unwrap_or_else(|_| "qbu-dev-salt-change-in-production".to_string()),

            invoice_from: env::var("QBU_INVOICE_FROM")
                .unwrap_or_else(|_| "orders@qbu.example".to_string()),
        };

        if config.ticket_salt.trim().is_empty() {
            return Err(ConfigError::InvalidValue("QBU_TICKET_SALT".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        // no env set in tests: defaults apply
        let config = ApiConfig::load().unwrap();
        assert!(config.http_port > 0);
        assert!(!config.ticket_salt.is_empty());
    }
}
