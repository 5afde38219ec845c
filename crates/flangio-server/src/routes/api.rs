//! JSON account API authenticated with HTTP Basic

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Form, Router};
use flangio_accounts::{CREATE_OTHER_USERS, DELETE_OTHER_USERS};
use flangio_common::{Envelope, FieldError, FlangioError};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{require_capability, ApiUser};
use crate::forms::UserCreationForm;
use crate::response::JsonEnvelope;
use crate::state::AppState;

pub const USER_CREATION_FAILED_MESSAGE: &str = "User creation failed due to errors.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/accounts/test-credentials", get(test_credentials))
        .route("/api/accounts/create", post(create_user))
        .route(
            "/api/accounts/{email}/delete",
            post(delete_user).delete(delete_user),
        )
}

async fn test_credentials(ApiUser(user): ApiUser) -> JsonEnvelope {
    Envelope::ok(format!(
        "Your API credentials for user {} are valid.",
        user.username
    ))
    .into()
}

fn creation_failed(errors: Vec<FieldError>) -> JsonEnvelope {
    Envelope::field_errors(USER_CREATION_FAILED_MESSAGE, errors).into()
}

/// Create a user and link it to the caller in the social graph
async fn create_user(
    State(state): State<AppState>,
    ApiUser(caller): ApiUser,
    Form(form): Form<UserCreationForm>,
) -> JsonEnvelope {
    if let Err(e) = require_capability(&caller, CREATE_OTHER_USERS) {
        return e.into();
    }
    let new_user = match form.clean() {
        Ok(new_user) => new_user,
        Err(errors) => return creation_failed(errors),
    };
    let user = match state.accounts.create_user(new_user) {
        Ok(user) => user,
        Err(FlangioError::Validation(message)) => {
            return creation_failed(vec![FieldError::global(message)])
        }
        Err(e) => return e.into(),
    };

    if let Err(e) = state.social.connect(user.id, caller.id) {
        return e.into();
    }
    if state.auto_self_follow {
        if let Err(e) = state.social.connect(user.id, user.id) {
            warn!(user = %user.username, error = %e, "self follow skipped");
        }
    }

    info!(user = %user.username, created_by = %caller.username, "user created through the API");
    Envelope::ok(format!("User {} created.", user.username))
        .with_results(json!([user.summary()]))
        .into()
}

async fn delete_user(
    State(state): State<AppState>,
    ApiUser(caller): ApiUser,
    Path(email): Path<String>,
) -> JsonEnvelope {
    if let Err(e) = require_capability(&caller, DELETE_OTHER_USERS) {
        return e.into();
    }
    match state.accounts.delete_by_email(&email) {
        Ok(user) => {
            state.sessions.destroy_for_user(user.id);
            state.social.remove_user(user.id);
            info!(email = %email, deleted_by = %caller.username, "user deleted through the API");
            Envelope::ok(format!("User {} deleted.", email)).into()
        }
        Err(e) => e.into(),
    }
}
