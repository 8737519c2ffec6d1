//! HTML pages rendered from the built-in templates

use axum::http::StatusCode;

const INDEX_HTML: &str = include_str!("../resources/index.html");
const REGISTER_HTML: &str = include_str!("../resources/register.html");
const VERIFY_HTML: &str = include_str!("../resources/verify.html");
const SUCCESS_HTML: &str = include_str!("../resources/success.html");
const ERROR_HTML: &str = include_str!("../resources/error.html");
const DASHBOARD_HTML: &str = include_str!("../resources/dashboard.html");
const LISTING_HTML: &str = include_str!("../resources/listing.html");

/// A link shown on the index page
pub struct IndexLink<'a> {
    pub href: &'a str,
    pub title: &'a str,
}

pub fn index_page(links: &[IndexLink<'_>]) -> String {
    let items: String = links
        .iter()
        .map(|link| {
            format!(
                "        <li><a href=\"{}\">{}</a></li>\n",
                escape_html(link.href),
                escape_html(link.title)
            )
        })
        .collect();
    INDEX_HTML.replace("{{items}}", &items)
}

pub fn register_form() -> &'static str {
    REGISTER_HTML
}

/// Shown after a registration was staged and the confirmation mail went out
pub fn check_email_page() -> &'static str {
    VERIFY_HTML
}

pub fn success_page(login: &str) -> String {
    SUCCESS_HTML.replace("{{login}}", &escape_html(login))
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    ERROR_HTML
        .replace("{{color}}", status_color(status))
        .replace("{{code}}", status.as_str())
        .replace("{{reason}}", status.canonical_reason().unwrap_or("Error"))
        .replace("{{message}}", &escape_html(message))
}

pub fn dashboard_page(upload_count: u64, items: &str) -> String {
    DASHBOARD_HTML
        .replace("{{count}}", &upload_count.to_string())
        .replace("{{items}}", items)
}

pub fn listing_page(path: &str, rows: &str) -> String {
    LISTING_HTML
        .replace("{{path}}", &escape_html(path))
        .replace("{{rows}}", rows)
}

fn status_color(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "rgba(147, 0, 0, 0.90)",
        401 => "rgba(147, 51, 0, 0.90)",
        403 => "rgba(147, 83, 0, 0.90)",
        404 => "rgba(147, 122, 0, 0.90)",
        405 => "rgba(147, 147, 0, 0.90)",
        406 => "rgba(0, 147, 125, 0.90)",
        409 => "rgba(47, 0, 147, 0.90)",
        501 => "rgba(147, 0, 100, 0.90)",
        503 => "rgba(147, 0, 142, 0.90)",
        _ => "rgba(147, 0, 56, 0.90)",
    }
}

/// Percent-encode a path for use in an href, keeping `/` separators
pub fn encode_href(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
