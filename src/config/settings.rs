//! Application settings loaded from `config.toml` and the environment.
//!
//! Non-secret settings live in a TOML file whose path defaults to `./config.toml`
//! and can be overridden with `REUNION_CONFIG`. A missing file is not an error:
//! every section has defaults. Secrets are read only from environment variables
//! after the file is parsed.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Session token settings
    pub session: SessionConfig,
    /// Payment policy used by the ledger
    pub ledger: LedgerPolicy,
    /// Local object storage for uploads
    pub uploads: UploadConfig,
    /// Outgoing mail settings
    pub mail: MailConfig,
    /// Super-admin ensured at startup
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind: String,
    /// Base URL of the frontend, used to build registration links
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; `DATABASE_URL` takes precedence
    pub url: Option<String>,
}

/// Session token settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a normal login, in minutes
    pub default_ttl_minutes: i64,
    /// Lifetime of a "remember me" login, in days
    pub remember_me_ttl_days: i64,
    /// HMAC key from `SESSION_SECRET`
    #[serde(skip)]
    pub secret: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl_minutes: 120,
            remember_me_ttl_days: 30,
            secret: String::new(),
        }
    }
}

/// Payment policy injected into the ledger aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerPolicy {
    /// Amount each member owes
    pub due_amount: Decimal,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            due_amount: Decimal::from(25_000),
        }
    }
}

/// Local object storage for uploads
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded files are written to
    pub directory: PathBuf,
    /// URL path prefix the directory is served under
    pub public_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data/uploads"),
            public_prefix: "/uploads".to_string(),
        }
    }
}

/// Outgoing mail settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Sender mailbox, e.g. `Reunion Committee <committee@example.org>`
    pub from: String,
    /// SMTP relay host; without one, mail is only logged
    pub smtp_host: Option<String>,
    /// SMTP port (STARTTLS)
    pub smtp_port: u16,
    /// From `SMTP_USERNAME`
    #[serde(skip)]
    pub smtp_username: Option<String>,
    /// From `SMTP_PASSWORD`
    #[serde(skip)]
    pub smtp_password: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: "Reunion Committee <noreply@localhost>".to_string(),
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
        }
    }
}

/// Super-admin ensured at startup
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    /// Email of the super-admin
    pub email: String,
    /// Display name
    pub name: String,
    /// From `BOOTSTRAP_ADMIN_PASSWORD`
    #[serde(skip)]
    pub password: Option<String>,
}

/// Parses configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the full application configuration: file (if present) plus secrets from
/// the environment.
///
/// # Errors
/// Returns an error if the file exists but is invalid, or `SESSION_SECRET` is unset.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("REUNION_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        tracing::warn!("No configuration file at {}, using defaults", path);
        AppConfig::default()
    };

    config.apply_env()?;
    Ok(config)
}

impl AppConfig {
    /// Fills secret fields from the environment.
    fn apply_env(&mut self) -> Result<()> {
        self.session.secret = std::env::var("SESSION_SECRET")
            .inspect_err(|_| tracing::error!("SESSION_SECRET is not set"))?;
        if self.session.secret.len() < 32 {
            return Err(Error::Config {
                message: "SESSION_SECRET must be at least 32 bytes".to_string(),
            });
        }

        self.mail.smtp_username = std::env::var("SMTP_USERNAME").ok();
        self.mail.smtp_password = std::env::var("SMTP_PASSWORD").ok();

        if let Some(bootstrap) = self.bootstrap_admin.as_mut() {
            bootstrap.password = std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            bind = "127.0.0.1:9000"
            public_base_url = "https://reunion.example.org"

            [session]
            default_ttl_minutes = 60
            remember_me_ttl_days = 14

            [ledger]
            due_amount = "30000"

            [mail]
            from = "Committee <committee@example.org>"
            smtp_host = "smtp.example.org"

            [bootstrap_admin]
            email = "chair@example.org"
            name = "Committee Chair"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.session.default_ttl_minutes, 60);
        assert_eq!(config.session.remember_me_ttl_days, 14);
        assert_eq!(config.ledger.due_amount, Decimal::from(30_000));
        assert_eq!(config.mail.smtp_host.as_deref(), Some("smtp.example.org"));
        assert_eq!(config.mail.smtp_port, 587);
        let bootstrap = config.bootstrap_admin.unwrap();
        assert_eq!(bootstrap.email, "chair@example.org");
        assert!(bootstrap.password.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.ledger.due_amount, Decimal::from(25_000));
        assert_eq!(config.session.default_ttl_minutes, 120);
        assert_eq!(config.uploads.public_prefix, "/uploads");
        assert!(config.bootstrap_admin.is_none());
        assert!(config.session.secret.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = parse_config("[ledger\ndue_amount = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
