//! Public base URL of short links.

use axum::http::{HeaderMap, header};

/// Returns the base that short links are appended to.
///
/// A configured base wins. Otherwise the request's `Host` header is used
/// (port included) with the `https` scheme. Without either the result is
/// empty and short links are returned as absolute paths.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "cal.example:8080".parse().unwrap());
///
/// assert_eq!(public_base_url(None, &headers), "https://cal.example:8080");
/// ```
pub fn public_base_url(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = configured {
        return base.trim_end_matches('/').to_string();
    }

    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|host| is_plausible_host(host))
        .map(|host| format!("https://{host}"))
        .unwrap_or_default()
}

fn is_plausible_host(host: &str) -> bool {
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'))
}
