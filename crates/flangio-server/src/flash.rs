//! One-shot flash messages carried in a cookie across a redirect
//!
//! Pending messages are stored as URL-encoded JSON. Every redirect re-issues
//! the cookie with the old messages plus the new ones, keeping only the
//! newest [`MAX_FLASH_MESSAGES`]. The home page hands them out and clears
//! the cookie.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::cookies::{cookie_value, expire_cookie, set_cookie};
use crate::response::SeeOther;

pub const FLASH_COOKIE: &str = "flangio_messages";

/// Pending messages kept in the cookie
pub const MAX_FLASH_MESSAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub message: String,
}

/// Messages pending for this browser, plus any added while handling the request
#[derive(Debug, Clone, Default)]
pub struct Flash {
    messages: Vec<FlashMessage>,
}

impl Flash {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let messages = cookie_value(headers, FLASH_COOKIE)
            .and_then(|raw| urlencoding::decode(&raw).ok().map(|s| s.into_owned()))
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        Self { messages }
    }

    pub fn success(mut self, message: impl Into<String>) -> Self {
        self.messages.push(FlashMessage {
            level: Level::Success,
            message: message.into(),
        });
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.messages.push(FlashMessage {
            level: Level::Error,
            message: message.into(),
        });
        self
    }

    pub fn messages(&self) -> &[FlashMessage] {
        &self.messages
    }

    /// Hand the messages out and produce the cookie that clears them
    pub fn take(self) -> (Vec<FlashMessage>, String) {
        (self.messages, expire_cookie(FLASH_COOKIE))
    }

    fn cookie(&self) -> String {
        let newest = &self.messages[self.messages.len().saturating_sub(MAX_FLASH_MESSAGES)..];
        let json = serde_json::to_string(newest).unwrap_or_else(|_| "[]".to_string());
        set_cookie(FLASH_COOKIE, &urlencoding::encode(&json))
    }

    /// Redirect to `location` carrying every message
    pub fn redirect(self, location: impl Into<String>) -> SeeOther {
        SeeOther::to(location).cookie(self.cookie())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Flash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Flash::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;

    fn headers_from_set_cookie(set_cookie: &str) -> HeaderMap {
        let pair = set_cookie.split(';').next().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(pair).unwrap());
        headers
    }

    #[test]
    fn test_messages_survive_redirect() {
        let response = Flash::default()
            .success("Database created.")
            .redirect("/mongodb/")
            .into_response();
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/mongodb/");

        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let flash = Flash::from_headers(&headers_from_set_cookie(set_cookie));
        assert_eq!(
            flash.messages(),
            &[FlashMessage {
                level: Level::Success,
                message: "Database created.".to_string(),
            }]
        );
    }

    #[test]
    fn test_messages_accumulate() {
        let first = Flash::default().error("one").cookie();
        let flash = Flash::from_headers(&headers_from_set_cookie(&first)).error("two; with semicolon");
        let second = flash.cookie();
        let reread = Flash::from_headers(&headers_from_set_cookie(&second));
        assert_eq!(reread.messages().len(), 2);
        assert_eq!(reread.messages()[1].message, "two; with semicolon");
    }

    #[test]
    fn test_cookie_keeps_newest_messages() {
        let mut cookie = Flash::default().cookie();
        for i in 0..25 {
            let flash = Flash::from_headers(&headers_from_set_cookie(&cookie));
            cookie = flash.success(format!("message {}", i)).cookie();
        }
        let reread = Flash::from_headers(&headers_from_set_cookie(&cookie));
        assert_eq!(reread.messages().len(), MAX_FLASH_MESSAGES);
        assert_eq!(reread.messages()[0].message, "message 15");
        assert_eq!(reread.messages()[9].message, "message 24");
        assert!(cookie.len() < 4096);
    }

    #[test]
    fn test_garbage_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("flangio_messages=%7Bnot-json"));
        assert!(Flash::from_headers(&headers).messages().is_empty());
    }

    #[test]
    fn test_take_clears() {
        let (messages, cookie) = Flash::default().success("hi").take();
        assert_eq!(messages.len(), 1);
        assert!(cookie.contains("Max-Age=0"));
    }
}
