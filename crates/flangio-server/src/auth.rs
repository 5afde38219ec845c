//! Request authentication: HTTP Basic for the API, session cookie for forms

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flangio_accounts::{User, SESSION_COOKIE};
use flangio_common::{FlangioError, Result};
use tracing::debug;

use crate::cookies::cookie_value;
use crate::response::JsonEnvelope;
use crate::state::AppState;

pub const CREDENTIALS_MISSING_MESSAGE: &str = "Authentication credentials were not provided.";
pub const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to do that.";

/// `(login, password)` from an `Authorization: Basic` header
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (login, password) = decoded.split_once(':')?;
    Some((login.to_string(), password.to_string()))
}

/// Fails with 403 unless `user` holds `capability`
pub fn require_capability(user: &User, capability: &str) -> Result<()> {
    if user.has_capability(capability) {
        Ok(())
    } else {
        debug!(user = %user.username, capability, "capability missing");
        Err(FlangioError::Forbidden(format!(
            "You do not have the {} permission.",
            capability
        )))
    }
}

/// User behind the session cookie, if the session and account are live
pub fn session_user(state: &AppState, headers: &HeaderMap) -> Option<User> {
    let token = cookie_value(headers, SESSION_COOKIE)?;
    let user_id = state.sessions.user_id(&token)?;
    state.accounts.get(user_id).filter(|u| u.is_active)
}

fn unauthorized(message: &str, challenge: bool) -> Response {
    let mut response =
        JsonEnvelope::from(FlangioError::Unauthorized(message.to_string())).into_response();
    if challenge {
        response.headers_mut().insert(
            WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"flangio\""),
        );
    }
    response
}

/// Caller authenticated with HTTP Basic
#[derive(Debug, Clone)]
pub struct ApiUser(pub User);

impl FromRequestParts<AppState> for ApiUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let Some((login, password)) = basic_credentials(&parts.headers) else {
            return Err(unauthorized(CREDENTIALS_MISSING_MESSAGE, true));
        };
        match state.accounts.authenticate(&login, &password) {
            Ok(user) => Ok(ApiUser(user)),
            Err(e) => {
                debug!(login = %login, error = %e, "basic authentication failed");
                Err(unauthorized(&e.to_string(), true))
            }
        }
    }
}

/// Caller logged in through the login form
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        session_user(state, &parts.headers)
            .map(SessionUser)
            .ok_or_else(|| unauthorized(LOGIN_REQUIRED_MESSAGE, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flangio_accounts::{NewUser, CREATE_OTHER_USERS};
    use flangio_mongodb::StoreConfig;

    fn basic(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_basic_credentials() {
        let header = format!("Basic {}", STANDARD.encode("alice:pa:ss"));
        assert_eq!(
            basic_credentials(&basic(&header)),
            Some(("alice".to_string(), "pa:ss".to_string()))
        );
        assert_eq!(basic_credentials(&basic("Bearer abc")), None);
        assert_eq!(basic_credentials(&basic("Basic !!!")), None);
        assert_eq!(basic_credentials(&HeaderMap::new()), None);
    }

    #[test]
    fn test_require_capability() {
        let state = AppState::in_memory(StoreConfig::default());
        let user = state
            .accounts
            .create_user(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
                ..NewUser::default()
            })
            .unwrap();
        let err = require_capability(&user, CREATE_OTHER_USERS).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(
            err.to_string(),
            "You do not have the create-other-users permission."
        );

        state.accounts.grant(user.id, CREATE_OTHER_USERS).unwrap();
        let user = state.accounts.get(user.id).unwrap();
        assert!(require_capability(&user, CREATE_OTHER_USERS).is_ok());
    }

    #[test]
    fn test_session_user() {
        let state = AppState::in_memory(StoreConfig::default());
        let user = state
            .accounts
            .create_user(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
                ..NewUser::default()
            })
            .unwrap();
        let token = state.sessions.create(user.id);
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token)).unwrap(),
        );
        assert_eq!(session_user(&state, &headers).map(|u| u.id), Some(user.id));

        state.accounts.set_active(user.id, false).unwrap();
        assert!(session_user(&state, &headers).is_none());
    }
}
