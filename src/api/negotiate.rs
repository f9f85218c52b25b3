//! Response encoding.
//!
//! Bodies are JSON unless the request's `Accept` header is exactly
//! `application/xml`. XML documents take their root element from the serde
//! name of the payload type (`Secret`, `Error`).

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=UTF-8";

/// Wire format selected for a response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants_xml = headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.trim().eq_ignore_ascii_case("application/xml"));

        if wants_xml {
            Self::Xml
        } else {
            Self::Json
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => JSON_CONTENT_TYPE,
            Self::Xml => XML_CONTENT_TYPE,
        }
    }

    /// Serialize `body` in this format.
    pub fn encode<T: Serialize>(&self, body: &T) -> Result<String, String> {
        match self {
            Self::Json => serde_json::to_string(body).map_err(|e| e.to_string()),
            Self::Xml => quick_xml::se::to_string(body).map_err(|e| e.to_string()),
        }
    }

    /// Build a response with `status` and `body` encoded in this format.
    pub fn render<T: Serialize>(&self, status: StatusCode, body: &T) -> Response {
        match self.encode(body) {
            Ok(encoded) => (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(self.content_type()))],
                encoded,
            )
                .into_response(),
            Err(e) => {
                error!(error = %e, format = ?self, "Failed to encode response body");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// A payload paired with the status and format it is sent with
#[derive(Debug)]
pub struct Negotiated<T> {
    pub format: ResponseFormat,
    pub status: StatusCode,
    pub body: T,
}

impl<T> Negotiated<T> {
    pub fn new(format: ResponseFormat, status: StatusCode, body: T) -> Self {
        Self { format, status, body }
    }

    pub fn ok(format: ResponseFormat, body: T) -> Self {
        Self::new(format, StatusCode::OK, body)
    }
}

impl<T: Serialize> IntoResponse for Negotiated<T> {
    fn into_response(self) -> Response {
        self.format.render(self.status, &self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename = "Error")]
    struct Body {
        message: String,
    }

    fn headers(accept: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_str(accept).unwrap());
        headers
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(ResponseFormat::from_headers(&HeaderMap::new()), ResponseFormat::Json);
        assert_eq!(ResponseFormat::from_headers(&headers("application/xml")), ResponseFormat::Xml);
        assert_eq!(ResponseFormat::from_headers(&headers("Application/XML")), ResponseFormat::Xml);
        assert_eq!(ResponseFormat::from_headers(&headers("application/json")), ResponseFormat::Json);
        // Only an exact match selects XML
        assert_eq!(
            ResponseFormat::from_headers(&headers("text/html, application/xml;q=0.9")),
            ResponseFormat::Json
        );
        assert_eq!(ResponseFormat::from_headers(&headers("*/*")), ResponseFormat::Json);
    }

    #[test]
    fn test_encode() {
        let body = Body { message: "Secret not found".to_string() };

        assert_eq!(ResponseFormat::Json.encode(&body).unwrap(), r#"{"message":"Secret not found"}"#);
        assert_eq!(
            ResponseFormat::Xml.encode(&body).unwrap(),
            "<Error><message>Secret not found</message></Error>"
        );
    }

    #[test]
    fn test_render_sets_content_type() {
        let body = Body { message: "x".to_string() };

        let response = Negotiated::new(ResponseFormat::Xml, StatusCode::NOT_FOUND, body).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XML_CONTENT_TYPE);

        let response = Negotiated::ok(ResponseFormat::Json, Body { message: "y".to_string() }).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_CONTENT_TYPE);
    }
}
