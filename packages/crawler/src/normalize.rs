//! URL canonicalization and host comparison.
//!
//! Normalized URLs are the identity keys for visitation tracking: two URLs
//! that normalize to the same string are the same page.

use url::Url;

/// Canonical string form of a URL: fragment stripped, at most one trailing
/// slash removed. Query strings are preserved. Input the parser rejects
/// comes back verbatim, so the caller can still use it as a map key.
///
/// Idempotent: `normalize_url(normalize_url(u)) == normalize_url(u)`.
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            let rendered = url.to_string();
            match rendered.strip_suffix('/') {
                Some(stripped) => stripped.to_string(),
                None => rendered,
            }
        }
        Err(_) => raw.to_string(),
    }
}

/// Resolve an href found on `base` to an absolute crawlable URL.
///
/// Non-http(s) schemes (`mailto:`, `javascript:`, ...) resolve to `None`.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let joined = base.join(href).ok()?;
    if joined.scheme() == "http" || joined.scheme() == "https" {
        Some(joined)
    } else {
        None
    }
}

/// Hostname equality between two URL strings.
///
/// Unlike [`normalize_url`], this check fails closed: anything unparseable
/// or host-less is never same-host.
pub fn same_host(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => match (a.host_str(), b.host_str()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        _ => false,
    }
}
