//! Minimal cookie handling for the session and flash cookies

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Value of the first cookie named `name` across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// `Set-Cookie` value for a browser-session cookie
pub fn set_cookie(name: &str, value: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value)
}

/// `Set-Cookie` value that removes the cookie
pub fn expire_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", name)
}
