//! Account records and the rules a registration must satisfy

use std::fmt;

use crate::{Error, Result};

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Field separator of the persisted account file
pub const FIELD_SEPARATOR: &str = " : ";

/// A confirmed account: `login : email : password`
///
/// The password is kept exactly as submitted. The persisted file format has
/// always stored it in clear text and stays compatible with that.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub login: String,
    pub email: String,
    pub password: String,
}

impl AccountRecord {
    pub fn new(
        login: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            login: login.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Parse one line of the account file.
    ///
    /// Returns `None` when the line does not split into exactly three fields
    /// or the login is empty. Separators inside fields are not escaped, so a
    /// field containing ` : ` makes its line unreadable.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        match fields.as_slice() {
            [login, email, password] if !login.is_empty() => {
                Some(Self::new(*login, *email, *password))
            }
            _ => None,
        }
    }

    /// Encode as one line of the account file, without the newline
    pub fn to_line(&self) -> String {
        [
            self.login.as_str(),
            self.email.as_str(),
            self.password.as_str(),
        ]
        .join(FIELD_SEPARATOR)
    }

    /// Domain part of the email address, if it has one
    pub fn email_domain(&self) -> Option<&str> {
        email_domain(&self.email)
    }
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("login", &self.login)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Check that required fields are present and the password is acceptable.
///
/// The email is only required when registration goes through email
/// confirmation.
pub fn validate_required(record: &AccountRecord, email_required: bool) -> Result<()> {
    if record.login.is_empty() {
        return Err(Error::MissingField("Login"));
    }
    if email_required && record.email.is_empty() {
        return Err(Error::MissingField("Email"));
    }
    validate_password(&record.password)
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::PasswordTooShort);
    }
    if password.chars().any(char::is_whitespace) {
        return Err(Error::PasswordWhitespace);
    }
    Ok(())
}

/// Check login and email against the allowed formats.
///
/// An empty email passes here; whether it is required is decided by
/// [`validate_required`].
pub fn validate_format(record: &AccountRecord) -> Result<()> {
    let email_ok = record.email.is_empty() || is_valid_email(&record.email);
    if is_valid_login(&record.login) && email_ok {
        Ok(())
    } else {
        Err(Error::BadFormat)
    }
}

/// Letters, digits and underscores only
pub fn is_valid_login(login: &str) -> bool {
    login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `local@label.rest`: local part of `[A-Za-z0-9_.+-]`, a first domain label
/// of `[A-Za-z0-9-]`, then at least one dot followed by `[A-Za-z0-9.-]`
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((label, rest)) = domain.split_once('.') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_.+-".contains(c));
    let label_ok = !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    let rest_ok = !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

    local_ok && label_ok && rest_ok
}

pub fn email_domain(email: &str) -> Option<&str> {
    email.split_once('@').map(|(_, domain)| domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_round_trip() {
        let record = AccountRecord::new("alice", "alice@example.com", "longenough");
        let line = record.to_line();
        assert_eq!(line, "alice : alice@example.com : longenough");
        assert_eq!(AccountRecord::parse_line(&line), Some(record));
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        assert_eq!(AccountRecord::parse_line(""), None);
        assert_eq!(AccountRecord::parse_line("alice : alice@example.com"), None);
        assert_eq!(AccountRecord::parse_line("a : b : c : d"), None);
        assert_eq!(AccountRecord::parse_line(" : b : c"), None);
    }

    #[test]
    fn test_parse_line_ignores_line_endings() {
        let record = AccountRecord::parse_line("bob : bob@example.org : hunter2hunter2\r\n").unwrap();
        assert_eq!(record.password, "hunter2hunter2");
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(validate_password("short"), Err(Error::PasswordTooShort));
        assert_eq!(validate_password(""), Err(Error::PasswordTooShort));
        assert_eq!(validate_password("has a space"), Err(Error::PasswordWhitespace));
        assert_eq!(validate_password("tab\tinside"), Err(Error::PasswordWhitespace));
        assert_eq!(validate_password("longenough"), Ok(()));
        assert_eq!(validate_password("12345678"), Ok(()));
    }

    #[test]
    fn test_required_fields() {
        let missing_login = AccountRecord::new("", "a@b.c", "longenough");
        assert_eq!(
            validate_required(&missing_login, true),
            Err(Error::MissingField("Login"))
        );

        let missing_email = AccountRecord::new("alice", "", "longenough");
        assert_eq!(
            validate_required(&missing_email, true),
            Err(Error::MissingField("Email"))
        );
        assert_eq!(validate_required(&missing_email, false), Ok(()));
    }

    #[test]
    fn test_login_format() {
        assert!(is_valid_login("alice_01"));
        assert!(!is_valid_login("alice-01"));
        assert!(!is_valid_login("../alice"));
        assert!(!is_valid_login("al ice"));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+tag@mail.example.co.uk"));
        assert!(!is_valid_email("alice@localhost"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@exa_mple.com"));
        assert!(!is_valid_email("alice"));
    }

    #[test]
    fn test_format_rejects_bad_login_or_email() {
        let bad_login = AccountRecord::new("al!ce", "alice@example.com", "longenough");
        assert_eq!(validate_format(&bad_login), Err(Error::BadFormat));
        let bad_email = AccountRecord::new("alice", "alice@nowhere", "longenough");
        assert_eq!(validate_format(&bad_email), Err(Error::BadFormat));
        let no_email = AccountRecord::new("alice", "", "longenough");
        assert_eq!(validate_format(&no_email), Ok(()));
    }

    #[test]
    fn test_debug_hides_password() {
        let record = AccountRecord::new("alice", "alice@example.com", "longenough");
        assert!(!format!("{:?}", record).contains("longenough"));
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("alice@example.com"), Some("example.com"));
        assert_eq!(email_domain("alice"), None);
    }
}
