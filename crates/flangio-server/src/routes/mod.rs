//! HTTP routes

use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use flangio_common::Envelope;
use serde_json::json;

use crate::flash::Flash;
use crate::response::JsonEnvelope;
use crate::state::AppState;

pub mod accounts;
pub mod api;
pub mod dataimport;
pub mod mongodb;

pub const WELCOME_MESSAGE: &str = "Welcome to flangio.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .merge(mongodb::router())
        .merge(dataimport::router())
        .merge(accounts::router())
        .merge(api::router())
}

/// Hands out pending flash messages and clears them
async fn home(flash: Flash) -> Response {
    let (messages, clear) = flash.take();
    let mut response =
        JsonEnvelope(Envelope::ok(WELCOME_MESSAGE).with_results(json!(messages))).into_response();
    if let Ok(value) = HeaderValue::from_str(&clear) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}
