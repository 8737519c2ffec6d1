//! Console-based email sender for development

use super::{EmailSender, CONFIRMATION_SUBJECT};

/// Email sender that logs the confirmation link instead of mailing it
pub struct ConsoleEmailSender;

impl ConsoleEmailSender {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEmailSender {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailSender for ConsoleEmailSender {
    fn send_confirmation(&self, email: &str, link: &str) -> Result<(), String> {
        println!();
        println!("========================================");
        println!("  {}", CONFIRMATION_SUBJECT.to_uppercase());
        println!("  TO:   {}", email);
        println!("  LINK: {}", link);
        println!("========================================");
        println!();

        tracing::info!(email = %email, link = %link, "Confirmation link issued");

        Ok(())
    }
}
