//! Domain normalization and validation.
//!
//! Turns free-form caller input (`"WWW.Example.COM"`, `"https://example.com/a?b"`,
//! `"example.com:8080"`) into the [`CanonicalDomain`] used as the snapshot key.

use crate::domain::entities::CanonicalDomain;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// `label.label.tld`, labels of `[a-z0-9-]{1,63}`, TLD of two or more letters.
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9-]{1,63}\.)+[a-z]{2,}$").expect("domain pattern is a valid regex")
});

/// A scheme at the very start of the input, e.g. `https://` or `ftp://`.
static LEADING_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9+.-]*://").expect("scheme pattern is a valid regex")
});

const DEFAULT_SCHEME: &str = "http://";
const WWW_PREFIX: &str = "www.";

/// Errors that can occur during domain normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomainNormalizationError {
    #[error("Domain is empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no hostname")]
    MissingHost,

    #[error("Not a valid domain name: {0}")]
    InvalidDomain(String),
}

/// Normalizes raw input into a canonical domain.
///
/// # Normalization Rules
///
/// 1. Input is trimmed and lowercased
/// 2. `http://` is prepended when no scheme is present
/// 3. Only HTTP and HTTPS schemes are accepted
/// 4. The hostname is extracted; port, path, query and fragment are dropped
/// 5. Leading `www.` labels are stripped
/// 6. The result must match the canonical domain pattern
///
/// Stripping repeats until no `www.` prefix remains, so normalizing a canonical
/// domain again is a no-op.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_domain("WWW.Example.COM").unwrap().as_str(), "example.com");
/// assert_eq!(
///     normalize_domain("http://sub.example.co.uk/path").unwrap().as_str(),
///     "sub.example.co.uk"
/// );
/// assert!(normalize_domain("not a domain").is_err());
/// ```
pub fn normalize_domain(input: &str) -> Result<CanonicalDomain, DomainNormalizationError> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err(DomainNormalizationError::Empty);
    }

    // A URL inside the path or query is not a scheme for the input itself.
    let with_scheme = if LEADING_SCHEME.is_match(&trimmed) {
        trimmed
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| DomainNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(DomainNormalizationError::UnsupportedProtocol),
    }

    let mut host = url
        .host_str()
        .ok_or(DomainNormalizationError::MissingHost)?
        .to_ascii_lowercase();

    while let Some(rest) = host.strip_prefix(WWW_PREFIX) {
        host = rest.to_string();
    }

    if !is_valid_domain(&host) {
        return Err(DomainNormalizationError::InvalidDomain(host));
    }

    Ok(CanonicalDomain::new_unchecked(host))
}

fn is_valid_domain(host: &str) -> bool {
    DOMAIN_PATTERN.is_match(host) && host.split('.').all(|label| !label.starts_with('-'))
}
