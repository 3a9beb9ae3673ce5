use std::fmt::Display;

use reqwest::Url;

use crate::error::{AstrometryError, Result};

/// Accepts only well-formed absolute URLs with a host, the shape the remote
/// fetcher can download from. The raw string is what gets submitted, so input
/// the parser would have to repair is rejected instead of normalized.
pub fn validate_image_url(raw: &str) -> Result<Url> {
    let invalid = || AstrometryError::InvalidUrl(raw.to_string());
    if raw.is_empty()
        || !raw.chars().all(is_uri_char)
        || !has_valid_percent_escapes(raw)
        || !has_authority_prefix(raw)
    {
        return Err(invalid());
    }
    let url = Url::parse(raw).map_err(|_| invalid())?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid()),
    }
}

// RFC 3986 unreserved and reserved characters plus `%` for escapes.
fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?#[]@!$&'()*+,;=%".contains(c)
}

fn has_valid_percent_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().all(|(index, byte)| {
        *byte != b'%'
            || bytes
                .get(index + 1..index + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    })
}

/// `scheme://` with a scheme of `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn has_authority_prefix(raw: &str) -> bool {
    raw.split_once("://").is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|first| first.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

pub fn job_status_url(base: &str, job_id: impl Display) -> String {
    format!("{base}/{job_id}")
}

pub fn known_objects_url(base: &str, job_id: impl Display) -> String {
    format!("{base}/{job_id}/objects_in_field/")
}
