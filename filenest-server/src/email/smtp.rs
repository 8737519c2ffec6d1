//! SMTP-based email sender for production

use std::fmt;

use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

use super::{confirmation_body, EmailSender, CONFIRMATION_SUBJECT};
use crate::config::Config;

/// Configuration for SMTP email sending
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP relay host, e.g. "smtp.gmail.com"
    pub host: String,
    /// SMTP port (465 for implicit TLS)
    pub port: u16,
    /// Sender address, also used as the SMTP login
    pub from_email: String,
    pub password: String,
}

impl SmtpConfig {
    /// Build from the server configuration. `None` when no sender address is set.
    pub fn from_config(config: &Config) -> Option<Self> {
        let from_email = config.email.clone().filter(|s| !s.is_empty())?;
        let host = config
            .smtp_host
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_host(&from_email));

        Some(Self {
            host,
            port: config.smtp_port,
            from_email,
            password: config.email_password.clone().unwrap_or_default(),
        })
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from_email", &self.from_email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `smtp.<domain of the sender address>`
fn default_host(from_email: &str) -> String {
    match filenest_core::account::email_domain(from_email) {
        Some(domain) => format!("smtp.{}", domain),
        None => "localhost".to_string(),
    }
}

/// SMTP email sender for production use
pub struct SmtpEmailSender {
    transport: SmtpTransport,
    from_email: String,
}

impl SmtpEmailSender {
    /// Create a new SMTP email sender.
    ///
    /// A failed connection test is only logged; the relay may come up later.
    pub fn new(config: SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.from_email.clone(), config.password);

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
            .port(config.port)
            .credentials(creds)
            .build();

        match transport.test_connection() {
            Ok(_) => {
                tracing::info!(host = %config.host, port = config.port, "SMTP connection established")
            }
            Err(e) => {
                tracing::warn!(host = %config.host, port = config.port, error = %e, "SMTP connection test failed")
            }
        }

        Ok(Self {
            transport,
            from_email: config.from_email,
        })
    }

    fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let from = self
            .from_email
            .parse()
            .map_err(|e| format!("Invalid from address: {}", e))?;

        let to_addr = to
            .parse()
            .map_err(|e| format!("Invalid to address: {}", e))?;

        let email = Message::builder()
            .from(from)
            .to(to_addr)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| format!("Failed to build email: {}", e))?;

        self.transport
            .send(&email)
            .map_err(|e| format!("Failed to send email: {}", e))?;

        Ok(())
    }
}

impl EmailSender for SmtpEmailSender {
    fn send_confirmation(&self, email: &str, link: &str) -> Result<(), String> {
        self.send_email(email, CONFIRMATION_SUBJECT, &confirmation_body(link))?;
        tracing::info!(email = %email, "Confirmation email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_sender() {
        let config = Config::default();
        assert!(SmtpConfig::from_config(&config).is_none());
    }

    #[test]
    fn test_from_config_derives_host() {
        let config = Config {
            email: Some("files@example.com".to_string()),
            email_password: Some("secret".to_string()),
            ..Config::default()
        };
        let smtp = SmtpConfig::from_config(&config).unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 465);
        assert!(!format!("{:?}", smtp).contains("secret"));
    }
}
