//! Mail delivery settings loaded from the environment.
//!
//! Variable names are the ones the Artiverse deployment already uses
//! (`MAIL_USERNAME`, `MAIL_STARTTLS`, `USE_CREDENTIALS`, ...). Every problem is
//! collected before failing so a misconfigured deployment is fixed in one pass.

use crate::errors::{Error, FieldError, Result};
use email_address::EmailAddress;
use std::{collections::HashMap, fmt, path::Path};

/// Default display name on outgoing mail
pub const DEFAULT_FROM_NAME: &str = "Artiverse";
/// Default SMTP submission port
pub const DEFAULT_PORT: u16 = 587;
/// Default SMTP host
pub const DEFAULT_SERVER: &str = "smtp.gmail.com";

/// Validated SMTP settings.
///
/// Built once at start-up and shared read-only (usually behind an `Arc`)
/// with whatever sends mail.
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// SMTP authentication identity
    pub username: String,
    /// SMTP authentication secret (an app password or an OAuth2 access token)
    pub password: String,
    /// Envelope sender address
    pub from_address: String,
    /// Display name shown next to `from_address`
    pub from_name: String,
    /// SMTP port (587 for STARTTLS, 465 for implicit TLS)
    pub port: u16,
    /// SMTP host name
    pub server: String,
    /// Upgrade the plaintext connection with STARTTLS
    pub use_starttls: bool,
    /// Connect over TLS from the first byte
    pub use_implicit_tls: bool,
    /// Authenticate with `username`/`password`
    pub use_credentials: bool,
    /// Reject invalid or self-signed certificates
    pub validate_certs: bool,
    /// Authenticate with XOAUTH2 instead of a password mechanism
    pub use_oauth2: bool,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("port", &self.port)
            .field("server", &self.server)
            .field("use_starttls", &self.use_starttls)
            .field("use_implicit_tls", &self.use_implicit_tls)
            .field("use_credentials", &self.use_credentials)
            .field("validate_certs", &self.validate_certs)
            .field("use_oauth2", &self.use_oauth2)
            .finish()
    }
}

/// Parses the boolean spellings accepted in `.env` files.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "t" | "y" => Some(true),
        "0" | "false" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

/// Accumulates field errors while reading variables through a lookup function.
struct FieldReader<F> {
    lookup: F,
    errors: Vec<FieldError>,
}

impl<F> FieldReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn new(lookup: F) -> Self {
        Self {
            lookup,
            errors: Vec::new(),
        }
    }

    fn optional(&self, field: &'static str) -> Option<String> {
        (self.lookup)(field).filter(|value| !value.trim().is_empty())
    }

    fn required(&mut self, field: &'static str) -> String {
        self.optional(field).unwrap_or_else(|| {
            self.errors.push(FieldError::missing(field));
            String::new()
        })
    }

    fn required_email(&mut self, field: &'static str) -> String {
        let value = self.required(field);
        if !value.is_empty() && !EmailAddress::is_valid(value.trim()) {
            self.errors.push(FieldError::malformed(
                field,
                format!("is not a valid email address: {value:?}"),
            ));
        }
        value.trim().to_string()
    }

    fn string_or(&self, field: &'static str, default: &str) -> String {
        self.optional(field).unwrap_or_else(|| default.to_string())
    }

    fn port_or(&mut self, field: &'static str, default: u16) -> u16 {
        match self.optional(field) {
            None => default,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                self.errors.push(FieldError::malformed(
                    field,
                    format!("is not a valid port number: {raw:?}"),
                ));
                default
            }),
        }
    }

    fn bool_or(&mut self, field: &'static str, default: bool) -> bool {
        match self.optional(field) {
            None => default,
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                self.errors.push(FieldError::malformed(
                    field,
                    format!("is not a valid boolean: {raw:?}"),
                ));
                default
            }),
        }
    }
}

impl MailConfig {
    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] listing every missing required variable,
    /// every malformed value, and conflicting TLS modes.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut reader = FieldReader::new(lookup);

        let config = Self {
            username: reader.required_email("MAIL_USERNAME"),
            password: reader.required("MAIL_PASSWORD"),
            from_address: reader.required_email("MAIL_FROM"),
            from_name: reader.string_or("MAIL_FROM_NAME", DEFAULT_FROM_NAME),
            port: reader.port_or("MAIL_PORT", DEFAULT_PORT),
            server: reader.string_or("MAIL_SERVER", DEFAULT_SERVER),
            use_starttls: reader.bool_or("MAIL_STARTTLS", true),
            use_implicit_tls: reader.bool_or("MAIL_SSL_TLS", false),
            use_credentials: reader.bool_or("USE_CREDENTIALS", true),
            validate_certs: reader.bool_or("VALIDATE_CERTS", true),
            use_oauth2: reader.bool_or("MAIL_USE_OAUTH2", false),
        };

        if config.use_starttls && config.use_implicit_tls {
            reader.errors.push(FieldError::malformed(
                "MAIL_SSL_TLS",
                "cannot be enabled together with MAIL_STARTTLS",
            ));
        }

        if reader.errors.is_empty() {
            Ok(config)
        } else {
            Err(Error::InvalidConfig {
                fields: reader.errors,
            })
        }
    }

    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from the process environment, falling back to
    /// the variables defined in the override file at `path`.
    ///
    /// Variables already set in the environment take precedence over the file.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_layered(path.as_ref(), |key| std::env::var(key).ok())
    }

    fn from_layered<F>(path: &Path, primary: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = read_env_file(path)?;
        Self::from_lookup(|key| primary(key).or_else(|| overrides.get(key).cloned()))
    }
}

pub(crate) fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = dotenvy::from_path_iter(path).map_err(|e| Error::Config {
        message: format!("Failed to read env file {}: {e}", path.display()),
    })?;

    entries
        .map(|entry| {
            entry.map_err(|e| Error::Config {
                message: format!("Failed to parse env file {}: {e}", path.display()),
            })
        })
        .collect()
}
