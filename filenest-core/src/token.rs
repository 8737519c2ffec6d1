//! Confirmation tokens
//!
//! A token is a non-zero 32-bit number embedded in the confirmation link.

use crate::{sanitize, Error, Result};

/// Draws attempted before token generation gives up
pub const MAX_TOKEN_ATTEMPTS: usize = 10;

/// Draw a token that is non-zero and not `taken`.
///
/// At most [`MAX_TOKEN_ATTEMPTS`] values are drawn from `rng`; if every one of
/// them is zero or already taken, generation fails with `None`.
pub fn draw_token<R, T>(mut rng: R, taken: T) -> Option<u32>
where
    R: FnMut() -> u32,
    T: Fn(u32) -> bool,
{
    (0..MAX_TOKEN_ATTEMPTS)
        .map(|_| rng())
        .find(|token| *token != 0 && !taken(*token))
}

/// Parse the token part of a confirmation link.
///
/// The raw segment goes through the path sanitizer first, since it is taken
/// straight from the request path.
pub fn parse_token(raw: &str) -> Result<u32> {
    let cleaned = sanitize(raw);
    match cleaned.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidToken(raw.to_string())),
        Ok(token) => Ok(token),
    }
}
