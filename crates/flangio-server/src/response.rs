//! Response types: envelopes rendered as JSON and 303 redirects

use axum::http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use flangio_common::{Envelope, FlangioError};

/// An [`Envelope`] sent with HTTP status equal to its `code`
#[derive(Debug, Clone)]
pub struct JsonEnvelope(pub Envelope);

impl IntoResponse for JsonEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            self.0.to_pretty_json(),
        )
            .into_response()
    }
}

impl From<Envelope> for JsonEnvelope {
    fn from(envelope: Envelope) -> Self {
        Self(envelope)
    }
}

impl From<FlangioError> for JsonEnvelope {
    fn from(err: FlangioError) -> Self {
        Self(Envelope::from_error(&err))
    }
}

/// `303 See Other` carrying zero or more `Set-Cookie` headers
#[derive(Debug, Clone)]
pub struct SeeOther {
    location: String,
    cookies: Vec<String>,
}

impl SeeOther {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            cookies: Vec::new(),
        }
    }

    /// Attach a full `Set-Cookie` value
    pub fn cookie(mut self, set_cookie: impl Into<String>) -> Self {
        self.cookies.push(set_cookie.into());
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl IntoResponse for SeeOther {
    fn into_response(self) -> Response {
        let mut response = StatusCode::SEE_OTHER.into_response();
        let headers = response.headers_mut();
        match HeaderValue::from_str(&self.location) {
            Ok(value) => {
                headers.insert(LOCATION, value);
            }
            Err(_) => {
                headers.insert(LOCATION, HeaderValue::from_static("/"));
            }
        }
        for cookie in self.cookies {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                headers.append(SET_COOKIE, value);
            }
        }
        response
    }
}
