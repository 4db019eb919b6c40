//! CSRF token lookup.
//!
//! The server sets the token in the `csrftoken` cookie; it is read from the
//! cookie store for the API origin on every call and never cached.

use reqwest::cookie::CookieStore;
use reqwest::Url;

/// Cookie carrying the anti-forgery token
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Header the server expects the token in
pub const CSRF_HEADER_NAME: &str = "x-csrftoken";

/// Read the CSRF token for `url` from `store`
pub fn read_token(store: &dyn CookieStore, url: &Url) -> Option<String> {
    let header = store.cookies(url)?;
    let cookies = header.to_str().ok()?;
    find_cookie(cookies, CSRF_COOKIE_NAME)
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`).
/// Empty values count as absent.
pub fn find_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
