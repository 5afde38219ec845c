//! Helpers shared by the router tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flangio_mongodb::StoreConfig;
use flangio_server::{app, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_PASSWORD: &str = "rootpass";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_state(AppState::in_memory(StoreConfig::default()))
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            router: app(state.clone()),
            state,
        }
    }

    /// App with the bootstrap administrator in place
    pub fn with_admin() -> Self {
        let app = Self::new();
        app.state
            .accounts
            .bootstrap_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
            .unwrap();
        app
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        self.send(form_request(Method::POST, uri).body(encode_form(fields)).unwrap())
            .await
    }

    /// Flash messages a browser holding `response`'s cookies would see at home
    pub async fn flash_after(&self, response: &Response<Body>) -> Vec<String> {
        let cookie = cookie_pair(response, "flangio_messages").unwrap_or_default();
        let home = self
            .send(
                Request::get("/")
                    .header(COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        let body = json_body(home).await;
        body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["message"].as_str().unwrap().to_string())
            .collect()
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> Body {
    let encoded: Vec<String> = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    Body::from(encoded.join("&"))
}

pub fn form_request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
}

pub fn basic_auth(login: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", login, password)))
}

pub fn with_basic(
    builder: axum::http::request::Builder,
    login: &str,
    password: &str,
) -> axum::http::request::Builder {
    builder.header(AUTHORIZATION, basic_auth(login, password))
}

/// `name=value` of a cookie set by `response`
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
}

/// Body as JSON, checking that the HTTP status matches the envelope code
pub async fn json_body(response: Response<Body>) -> Value {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["code"].as_u64(), Some(status.as_u16() as u64));
    value
}

pub fn assert_redirect(response: &Response<Body>, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}
