//! Email delivery over SMTP for staff alerts.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use vesper_core::config::SmtpConfig;

/// Returns `None` from [`EmailService::from_config`] when email is disabled or SMTP is not
/// configured; callers treat that as "no email sink".
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl EmailService {
    pub fn from_config(config: &SmtpConfig) -> Option<Self> {
        if !config.enabled {
            tracing::debug!("Email disabled (EMAIL_ENABLED=false)");
            return None;
        }
        let host = config.host.as_deref()?;
        let from = config.from.clone()?;
        let port = config.port.unwrap_or(587);
        let credentials = match (config.user.as_deref(), config.password.as_deref()) {
            (Some(u), Some(p)) => Some(Credentials::new(u.to_string(), p.to_string())),
            _ => None,
        };

        let mailer = if config.tls {
            let mut builder = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                Ok(b) => b.port(port),
                Err(e) => {
                    tracing::warn!(host = %host, error = %e, "Invalid SMTP relay, email disabled");
                    return None;
                }
            };
            if let Some(c) = credentials {
                builder = builder.credentials(c);
            }
            tracing::info!(host = %host, port = port, "Email service initialized (SMTP with STARTTLS)");
            builder.build()
        } else {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            if let Some(c) = credentials {
                builder = builder.credentials(c);
            }
            tracing::info!(host = %host, port = port, "Email service initialized (SMTP)");
            builder.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
        })
    }

    /// Send a plain-text email. Unparseable recipients are skipped.
    pub async fn send(&self, to: &[String], subject: &str, body: &str) -> anyhow::Result<()> {
        if to.is_empty() {
            return Ok(());
        }
        let recipients: Vec<Mailbox> = to.iter().filter_map(|s| s.parse().ok()).collect();
        if recipients.is_empty() {
            return Err(anyhow!("No valid recipient addresses"));
        }
        let from: Mailbox = self.from.parse().context("Invalid SMTP_FROM")?;

        let mut builder = Message::builder().from(from).subject(subject);
        for mailbox in recipients {
            builder = builder.to(mailbox);
        }
        let message = builder
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("Failed to build email")?;

        self.mailer.send(message).await.context("SMTP send failed")?;
        tracing::info!(count = to.len(), subject = %subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp() -> SmtpConfig {
        SmtpConfig {
            enabled: true,
            host: Some("localhost".to_string()),
            port: Some(2525),
            user: None,
            password: None,
            from: Some("alerts@vesper.test".to_string()),
            tls: false,
        }
    }

    #[test]
    fn disabled_email_has_no_service() {
        let config = SmtpConfig {
            enabled: false,
            ..smtp()
        };
        assert!(EmailService::from_config(&config).is_none());
    }

    #[test]
    fn missing_host_or_from_has_no_service() {
        assert!(EmailService::from_config(&SmtpConfig { host: None, ..smtp() }).is_none());
        assert!(EmailService::from_config(&SmtpConfig { from: None, ..smtp() }).is_none());
    }

    #[tokio::test]
    async fn empty_recipient_list_is_a_noop() {
        let service = EmailService::from_config(&smtp()).unwrap();
        assert!(service.send(&[], "subject", "body").await.is_ok());
        assert!(service
            .send(&["not an address".to_string()], "subject", "body")
            .await
            .is_err());
    }
}
