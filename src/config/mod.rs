//! Application configuration.
//!
//! [`AppConfig::load`] is called exactly once during start-up. The resulting value
//! is immutable and is handed to the components that need it (usually inside an
//! `Arc`) instead of being read from a global.

/// Database configuration and connection management
pub mod database;

/// SMTP settings loaded from `MAIL_*` environment variables
pub mod mail;

pub use mail::MailConfig;

use crate::errors::{Error, FieldError, Result};
use tracing::{debug, error, info};

/// Default base URL of the web front end, used to build password reset links.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Everything the process needs to know before touching the database or sending mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Connection string for the relational store
    pub database_url: String,
    /// Base URL of the front end (no trailing slash)
    pub frontend_url: String,
    /// Outgoing mail settings
    pub mail: MailConfig,
}

impl AppConfig {
    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mail = MailConfig::from_lookup(&lookup);

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| database::DEFAULT_DATABASE_URL.to_string());

        let frontend_url = lookup("FRONTEND_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());

        let mut fields = Vec::new();
        if !frontend_url.starts_with("http://") && !frontend_url.starts_with("https://") {
            fields.push(FieldError::malformed(
                "FRONTEND_URL",
                format!("must be an http(s) URL: {frontend_url:?}"),
            ));
        }

        match mail {
            Ok(mail) if fields.is_empty() => Ok(Self {
                database_url,
                frontend_url: frontend_url.trim_end_matches('/').to_string(),
                mail,
            }),
            Ok(_) => Err(Error::InvalidConfig { fields }),
            Err(Error::InvalidConfig { fields: mut mail_fields }) => {
                mail_fields.append(&mut fields);
                Err(Error::InvalidConfig {
                    fields: mail_fields,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Loads the configuration for this process.
    ///
    /// Reads `.env` from the working directory if present (variables already set
    /// in the environment win), then validates every setting.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] naming every missing or malformed variable.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment overrides from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found, using process environment"),
            Err(e) => {
                return Err(Error::Config {
                    message: format!("Failed to load .env file: {e}"),
                });
            }
        }

        let config = Self::from_lookup(|key| std::env::var(key).ok())
            .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

        info!(
            server = %config.mail.server,
            port = config.mail.port,
            "Application configuration loaded"
        );
        Ok(config)
    }

    /// Link the user follows to choose a new password.
    #[must_use]
    pub fn password_reset_link(&self, token: &str) -> String {
        format!("{}/reset-password/{token}", self.frontend_url)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::lookup_from;

    const MAIL: [(&str, &str); 3] = [
        ("MAIL_USERNAME", "artiverse.bot@gmail.com"),
        ("MAIL_PASSWORD", "app-password"),
        ("MAIL_FROM", "no-reply@artiverse.app"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&MAIL)).unwrap();
        assert_eq!(config.database_url, database::DEFAULT_DATABASE_URL);
        assert_eq!(config.frontend_url, DEFAULT_FRONTEND_URL);
        assert_eq!(config.mail.port, 587);
    }

    #[test]
    fn test_reset_link_strips_trailing_slash() {
        let mut pairs = MAIL.to_vec();
        pairs.push(("FRONTEND_URL", "https://artiverse.app/"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.password_reset_link("abc123"),
            "https://artiverse.app/reset-password/abc123"
        );
    }

    #[test]
    fn test_mail_and_frontend_errors_reported_together() {
        let err = AppConfig::from_lookup(lookup_from(&[("FRONTEND_URL", "artiverse.app")]))
            .unwrap_err();
        let Error::InvalidConfig { fields } = err else {
            unreachable!("expected InvalidConfig");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field).collect();
        assert_eq!(
            names,
            vec!["MAIL_USERNAME", "MAIL_PASSWORD", "MAIL_FROM", "FRONTEND_URL"]
        );
    }
}
