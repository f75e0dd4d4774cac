//! Cookie jar shared by every request; the CSRF token is read back out of it.
//!
//! The jar is reqwest's own, so `Set-Cookie` expiry and `Path`/`Domain`
//! scoping follow browser rules.

use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use url::Url;

/// Jar seeded from a raw `Cookie` header (e.g. a copied browser session).
pub fn seeded_jar(cookie_header: Option<&str>, base_url: &Url) -> Arc<Jar> {
    let jar = Jar::default();
    for pair in cookie_header.unwrap_or_default().split(';').map(str::trim) {
        match pair.split_once('=') {
            Some((name, _)) if !name.trim().is_empty() => {
                jar.add_cookie_str(&format!("{}; Path=/", pair), base_url);
            }
            _ => {}
        }
    }
    Arc::new(jar)
}

/// Cookies the jar would send to `url`, as a single `Cookie` header value.
pub fn cookie_header(jar: &Jar, url: &Url) -> Option<String> {
    jar.cookies(url)
        .and_then(|value| value.to_str().ok().map(str::to_string))
}

/// Find cookie `name` in a `Cookie` header and percent-decode its value.
pub fn parse_cookie(cookie_header: &str, name: &str) -> Option<String> {
    if cookie_header.is_empty() {
        return None;
    }
    let prefix = format!("{}=", name);
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(percent_decode)
}

// `+` is literal in cookie values, unlike form encoding
fn percent_decode(raw: &str) -> String {
    let escaped = raw.replace('+', "%2B").replace('&', "%26");
    url::form_urlencoded::parse(format!("v={}", escaped).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}
