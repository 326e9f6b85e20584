//! Outgoing mail.
//!
//! [`build_transport`] turns a [`MailConfig`] into a `lettre` SMTP transport. Sending
//! goes through the [`Mailer`] trait so services can be exercised without a server.

use crate::{
    config::{AppConfig, MailConfig},
    errors::Result,
};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
    },
};
use std::sync::Arc;
use tracing::{debug, info};

/// Something that can deliver a fully built message.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers `message`, failing if the server does not accept it.
    async fn send(&self, message: Message) -> Result<()>;
}

#[async_trait]
impl Mailer for AsyncSmtpTransport<Tokio1Executor> {
    async fn send(&self, message: Message) -> Result<()> {
        AsyncTransport::send(self, message).await?;
        Ok(())
    }
}

/// Builds the SMTP transport described by `config`.
///
/// Implicit TLS wraps the connection from the start, STARTTLS is required when
/// enabled, and neither leaves the connection in plaintext. Certificate checks are
/// only relaxed when `validate_certs` is false.
pub fn build_transport(config: &MailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    let tls = if config.use_implicit_tls || config.use_starttls {
        let parameters = TlsParameters::builder(config.server.clone())
            .dangerous_accept_invalid_certs(!config.validate_certs)
            .build()?;
        if config.use_implicit_tls {
            Tls::Wrapper(parameters)
        } else {
            Tls::Required(parameters)
        }
    } else {
        Tls::None
    };

    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        .port(config.port)
        .tls(tls);

    if config.use_credentials {
        builder = builder.credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ));
    }

    if config.use_oauth2 {
        builder = builder.authentication(vec![Mechanism::Xoauth2]);
    }

    debug!(
        server = %config.server,
        port = config.port,
        implicit_tls = config.use_implicit_tls,
        starttls = config.use_starttls,
        "SMTP transport configured"
    );
    Ok(builder.build())
}

/// `"Display Name" <address>` mailbox used as the sender of every message.
pub fn sender_mailbox(config: &MailConfig) -> Result<Mailbox> {
    Ok(Mailbox::new(
        Some(config.from_name.clone()),
        config.from_address.parse()?,
    ))
}

/// Sends the application's transactional mail.
pub struct MailService {
    config: Arc<AppConfig>,
    mailer: Box<dyn Mailer>,
}

impl MailService {
    /// Creates a service that delivers through `mailer`.
    #[must_use]
    pub fn new(config: Arc<AppConfig>, mailer: Box<dyn Mailer>) -> Self {
        Self { config, mailer }
    }

    /// Creates a service backed by the SMTP transport described in `config`.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self> {
        let transport = build_transport(&config.mail)?;
        Ok(Self::new(config, Box::new(transport)))
    }

    /// Composes the password reset email for `to`.
    pub fn password_reset_message(&self, to: &str, token: &str) -> Result<Message> {
        let link = self.config.password_reset_link(token);
        let body = format!(
            "<p>Hola,</p>\n\
             <p>Recibimos una solicitud para restablecer tu contrasena de Artiverse.</p>\n\
             <p><a href=\"{link}\">Restablecer contrasena</a></p>\n\
             <p>El enlace vence en {} minutos. Si no la solicitaste, ignora este mensaje.</p>\n",
            crate::core::password_reset::TOKEN_TTL_MINUTES
        );

        Message::builder()
            .from(sender_mailbox(&self.config.mail)?)
            .to(to.parse()?)
            .subject("Restablece tu contrasena de Artiverse")
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(Into::into)
    }

    /// Sends the password reset email for `token` to `to`.
    pub async fn send_password_reset(&self, to: &str, token: &str) -> Result<()> {
        let message = self.password_reset_message(to, token)?;
        self.mailer.send(message).await?;
        info!("Password reset email sent");
        Ok(())
    }
}
