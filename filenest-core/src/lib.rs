//! Filenest Core Library
//!
//! I/O-free building blocks of the filenest appliance:
//! - Sanitizing user-supplied paths before they reach a storage root
//! - Deciding how a byte range of a static resource is answered
//! - Validating, encoding and decoding account records
//! - Drawing and parsing confirmation tokens

pub mod account;
pub mod error;
pub mod range;
pub mod sanitize;
pub mod token;

pub use account::AccountRecord;
pub use error::Error;
pub use range::{entity_tag, ByteRange, RangeOutcome};
pub use sanitize::{resolve, sanitize};
pub use token::{draw_token, parse_token, MAX_TOKEN_ATTEMPTS};

/// Result type for filenest-core operations
pub type Result<T> = std::result::Result<T, Error>;
