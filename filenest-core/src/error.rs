//! Error types for filenest-core

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Password is required and must be at least 8 characters long")]
    PasswordTooShort,

    #[error("The password should not contain whitespaces")]
    PasswordWhitespace,

    #[error("Wrong login or email format")]
    BadFormat,

    #[error("Invalid token: {0:?}")]
    InvalidToken(String),
}
