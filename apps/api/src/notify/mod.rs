pub mod templates;

use anyhow::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::Config;
use crate::models::candidature::Candidature;

/// Thin transport seam so unit tests can run without an SMTP server.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), String>;
}

#[async_trait]
impl Mailer for AsyncSmtpTransport<Tokio1Executor> {
    async fn send(&self, message: Message) -> Result<(), String> {
        AsyncTransport::send(self, message)
            .await
            .map(|_resp| ())
            .map_err(|e| e.to_string())
    }
}

/// Sends the confirmation and admin-notice emails for a submission.
///
/// Both sends are fire-and-log: a mail failure never fails the request or
/// rolls back the persisted candidature.
pub struct Notifier {
    mailer: Option<Box<dyn Mailer>>,
    from: String,
    admin_address: String,
    contact: String,
    support: String,
}

impl Notifier {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mailer: Option<Box<dyn Mailer>> = match &config.mail {
            Some(mail) => {
                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&mail.server)
                    .map_err(|e| anyhow::anyhow!("invalid MAIL_SERVER '{}': {e}", mail.server))?
                    .credentials(Credentials::new(
                        mail.username.clone(),
                        mail.password.clone(),
                    ))
                    .build();
                Some(Box::new(transport))
            }
            None => {
                info!("MAIL_SERVER not configured, outgoing mail disabled");
                None
            }
        };

        Ok(Self {
            mailer,
            from: config.mail_from.clone(),
            admin_address: config.email_contact.clone(),
            contact: config.email_contact.clone(),
            support: config.email_support.clone(),
        })
    }

    #[cfg(test)]
    pub fn with_mailer(mailer: Box<dyn Mailer>, from: &str, admin_address: &str) -> Self {
        Self {
            mailer: Some(mailer),
            from: from.to_string(),
            admin_address: admin_address.to_string(),
            contact: admin_address.to_string(),
            support: "support@example.com".to_string(),
        }
    }

    pub async fn send_confirmation(&self, c: &Candidature) {
        let subject = templates::confirmation_subject(c);
        let body = templates::confirmation_body(c, &self.contact, &self.support);
        if let Err(e) = self.dispatch(&c.email, &subject, &body).await {
            error!("confirmation email for {} failed: {e}", c.reference());
        }
    }

    pub async fn send_admin_notice(&self, c: &Candidature) {
        let subject = templates::admin_notice_subject(c);
        let body = templates::admin_notice_body(c);
        let to = self.admin_address.clone();
        if let Err(e) = self.dispatch(&to, &subject, &body).await {
            error!("admin notice for {} failed: {e}", c.reference());
        }
    }

    async fn dispatch(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let Some(mailer) = &self.mailer else {
            info!("mail disabled, dropping '{subject}' to {to}");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.parse().map_err(|e| format!("{e:?}"))?)
            .to(to.parse().map_err(|e| format!("{e:?}"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| e.to_string())?;

        mailer.send(message).await
    }
}
