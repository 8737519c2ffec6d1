//! Behaviour of the core building blocks through the public API

use std::path::Path;

use filenest_core::account::{validate_format, validate_password, validate_required};
use filenest_core::{
    draw_token, parse_token, resolve, sanitize, AccountRecord, ByteRange, Error, RangeOutcome,
    MAX_TOKEN_ATTEMPTS,
};

// =============================================================================
// Path sanitizer
// =============================================================================

#[test]
fn test_sanitize_is_single_pass() {
    assert_eq!(sanitize("/dir/../secret"), "/dirsecret");
    assert_eq!(sanitize("....//etc"), "../etc");
    assert_eq!(sanitize("plain/path.txt"), "plain/path.txt");
}

#[test]
fn test_sanitized_output_has_no_literal_sequences_from_input() {
    for raw in ["../../a", "a/../../b", "x/..", "../", "/..", "a/b/c"] {
        let cleaned = sanitize(raw);
        let direct = raw.contains("../") || raw.contains("/..");
        if direct {
            assert_ne!(cleaned, raw, "{} left untouched", raw);
        }
        assert!(!cleaned.contains("/.."), "{} -> {}", raw, cleaned);
    }
}

#[test]
fn test_resolve_stays_under_root() {
    let root = Path::new("/srv/www");
    assert_eq!(resolve(root, "../../etc/passwd"), Path::new("/srv/www/etc/passwd"));
    assert_eq!(resolve(root, "/absolute"), Path::new("/srv/www/absolute"));
    assert_eq!(resolve(root, ""), Path::new("/srv/www/"));
}

// =============================================================================
// Account validation
// =============================================================================

#[test]
fn test_password_length_boundary() {
    assert_eq!(validate_password("short"), Err(Error::PasswordTooShort));
    assert_eq!(validate_password("1234567"), Err(Error::PasswordTooShort));
    assert_eq!(validate_password("12345678"), Ok(()));
    assert_eq!(validate_password("longenough"), Ok(()));
    assert_eq!(validate_password("long\tenough"), Err(Error::PasswordWhitespace));
}

#[test]
fn test_registration_validation_order() {
    let record = AccountRecord::new("", "", "short");
    assert_eq!(
        validate_required(&record, true),
        Err(Error::MissingField("Login"))
    );

    let record = AccountRecord::new("alice", "", "longenough");
    assert_eq!(
        validate_required(&record, true),
        Err(Error::MissingField("Email"))
    );
    assert_eq!(validate_required(&record, false), Ok(()));

    let record = AccountRecord::new("al ice", "alice@example.com", "longenough");
    assert_eq!(validate_format(&record), Err(Error::BadFormat));

    let record = AccountRecord::new("alice_2", "alice@mail.example.com", "longenough");
    assert_eq!(validate_format(&record), Ok(()));
}

#[test]
fn test_passwd_line_format() {
    let record = AccountRecord::new("bob", "bob@example.org", "hunter2hunter2");
    assert_eq!(record.to_line(), "bob : bob@example.org : hunter2hunter2");
    assert_eq!(AccountRecord::parse_line("only : two"), None);
    assert_eq!(
        AccountRecord::parse_line("bob : bob@example.org : hunter2hunter2\r"),
        Some(record)
    );
}

// =============================================================================
// Ranges
// =============================================================================

#[test]
fn test_first_ten_bytes() {
    let outcome = RangeOutcome::decide(ByteRange::parse("bytes=0-9"), 100);
    assert_eq!(outcome.status(), 206);
    assert_eq!(outcome.content_length(), 10);
    assert_eq!(outcome.content_range().as_deref(), Some("bytes 0-9/100"));
}

#[test]
fn test_range_starting_at_length_unsatisfiable() {
    let outcome = RangeOutcome::decide(ByteRange::parse("bytes=100-"), 100);
    assert_eq!(outcome.status(), 416);
    assert_eq!(outcome.content_length(), 0);
    assert_eq!(outcome.content_range().as_deref(), Some("bytes */100"));
}

#[test]
fn test_reversed_range_unsatisfiable() {
    let outcome = RangeOutcome::decide(ByteRange::parse("bytes=9-3"), 100);
    assert_eq!(outcome.status(), 416);
}

// =============================================================================
// Tokens
// =============================================================================

#[test]
fn test_token_never_zero_or_taken() {
    let taken = [3u32, 4];
    let mut draws = [0u32, 3, 0, 4, 8].into_iter();
    let token = draw_token(|| draws.next().unwrap_or(0), |t| taken.contains(&t));
    assert_eq!(token, Some(8));
}

#[test]
fn test_token_generation_gives_up() {
    let mut calls = 0;
    let token = draw_token(
        || {
            calls += 1;
            7
        },
        |t| t == 7,
    );
    assert_eq!(token, None);
    assert_eq!(calls, MAX_TOKEN_ATTEMPTS);
}

#[test]
fn test_parse_token_from_path_segment() {
    assert_eq!(parse_token("123456"), Ok(123456));
    assert_eq!(parse_token("../123"), Ok(123));
    assert!(parse_token("0").is_err());
    assert!(parse_token("-5").is_err());
    assert!(parse_token("").is_err());
}
