//! Confirmation mail senders

pub mod console;
pub mod smtp;

pub use console::ConsoleEmailSender;
pub use smtp::{SmtpConfig, SmtpEmailSender};

/// Subject line of the confirmation mail
pub const CONFIRMATION_SUBJECT: &str = "Confirm registration of new account";

/// Trait for sending registration confirmation links.
///
/// Implementations may block; callers run them off the async executor.
pub trait EmailSender: Send + Sync {
    fn send_confirmation(&self, email: &str, link: &str) -> Result<(), String>;
}

/// Allow using Box<dyn EmailSender> as an EmailSender
impl EmailSender for Box<dyn EmailSender> {
    fn send_confirmation(&self, email: &str, link: &str) -> Result<(), String> {
        (**self).send_confirmation(email, link)
    }
}

/// Plain-text body of the confirmation mail
pub fn confirmation_body(link: &str) -> String {
    format!(
        "Someone registered an account with this address.\n\n\
         To confirm the registration, open the following link:\n\n\
         {}\n\n\
         If you didn't request this, you can safely ignore this email.",
        link
    )
}
