//! flangio HTTP server
//!
//! An axum application exposing the MongoDB admin operations, the data
//! import tracker and account management. [`app`] builds the router so tests
//! can drive it without binding a socket.

pub mod auth;
pub mod config;
pub mod cookies;
pub mod flash;
pub mod forms;
pub mod response;
pub mod routes;
pub mod state;

pub use config::{Backend, Config};
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Full application router with request tracing
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
