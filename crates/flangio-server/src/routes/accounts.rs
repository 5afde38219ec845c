//! Account form routes: login, logout, sign-up, profile and password

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use flangio_accounts::SESSION_COOKIE;
use flangio_common::{FieldError, FlangioError};
use serde::Deserialize;
use tracing::info;

use crate::auth::SessionUser;
use crate::cookies::{cookie_value, expire_cookie, set_cookie};
use crate::flash::Flash;
use crate::forms::{invalid_form, LoginForm, SetPasswordForm, UserChangeForm, UserCreationForm};
use crate::response::{JsonEnvelope, SeeOther};
use crate::state::AppState;

pub const HOME: &str = "/";
pub const LOGIN_SUCCESS_MESSAGE: &str = "You have logged in successfully.";
pub const LOGOUT_MESSAGE: &str = "Logged out successfully.";
pub const PASSWORD_UPDATED_MESSAGE: &str = "Password successfully updated.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts/login", post(login))
        .route("/accounts/logout", get(logout).post(logout))
        .route("/accounts/create", post(create_account))
        .route("/accounts/update", post(update_account))
        .route("/accounts/password", post(change_password))
}

/// Only same-site paths are followed after login
pub fn is_local_path(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}

fn rejected(errors: Vec<FieldError>) -> Response {
    JsonEnvelope(invalid_form(errors)).into_response()
}

/// A store-side validation failure reported against the whole form
fn form_failure(err: FlangioError) -> Response {
    match err {
        FlangioError::Validation(message) => rejected(vec![FieldError::global(message)]),
        other => JsonEnvelope::from(other).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NextParam {
    next: Option<String>,
}

async fn login(
    State(state): State<AppState>,
    Query(params): Query<NextParam>,
    flash: Flash,
    Form(form): Form<LoginForm>,
) -> Response {
    let (email, password) = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => return rejected(errors),
    };
    let user = match state.accounts.authenticate(&email, &password) {
        Ok(user) => user,
        Err(e) => {
            info!(email = %email, reason = %e, "login refused");
            return JsonEnvelope::from(e).into_response();
        }
    };

    let token = state.sessions.create(user.id);
    info!(user = %user.username, "logged in");
    let target = params
        .next
        .filter(|next| is_local_path(next))
        .unwrap_or_else(|| HOME.to_string());
    flash
        .success(LOGIN_SUCCESS_MESSAGE)
        .redirect(target)
        .cookie(set_cookie(SESSION_COOKIE, &token))
        .into_response()
}

async fn logout(State(state): State<AppState>, headers: HeaderMap, flash: Flash) -> impl IntoResponse {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        state.sessions.destroy(&token);
    }
    flash
        .success(LOGOUT_MESSAGE)
        .redirect(HOME)
        .cookie(expire_cookie(SESSION_COOKIE))
}

async fn create_account(State(state): State<AppState>, Form(form): Form<UserCreationForm>) -> Response {
    let new_user = match form.clean() {
        Ok(new_user) => new_user,
        Err(errors) => return rejected(errors),
    };
    match state.accounts.create_user(new_user) {
        Ok(_) => SeeOther::to(HOME).into_response(),
        Err(e) => form_failure(e),
    }
}

async fn update_account(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Form(form): Form<UserChangeForm>,
) -> Response {
    let update = match form.clean() {
        Ok(update) => update,
        Err(errors) => return rejected(errors),
    };
    match state.accounts.update_profile(user.id, update) {
        Ok(_) => SeeOther::to(HOME).into_response(),
        Err(e) => form_failure(e),
    }
}

async fn change_password(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    flash: Flash,
    Form(form): Form<SetPasswordForm>,
) -> Response {
    let password = match form.clean() {
        Ok(password) => password,
        Err(errors) => return rejected(errors),
    };
    match state.accounts.set_password(user.id, &password) {
        Ok(()) => flash
            .success(PASSWORD_UPDATED_MESSAGE)
            .redirect(HOME)
            .into_response(),
        Err(e) => form_failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/mongodb/"));
        assert!(is_local_path("/dataimport/?x=1"));
        assert!(!is_local_path("//evil.example.com/"));
        assert!(!is_local_path("https://evil.example.com/"));
        assert!(!is_local_path("/\\evil.example.com"));
        assert!(!is_local_path(""));
    }
}
