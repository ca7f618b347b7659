use http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use serde::Serialize;
use worker::Headers;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
pub const ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, User-Agent";

/// Builds a pretty-printed JSON response readable from any origin
pub fn json_response<T: Serialize>(body: &T, status: StatusCode) -> Response<String> {
    let text = serde_json::to_string_pretty(body).unwrap_or_else(|e| {
        serde_json::json!({ "success": false, "error": format!("Failed to encode response: {}", e) })
            .to_string()
    });

    let mut response = Response::new(text);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    response
}

/// Answers a CORS preflight: 204 with permissive headers and no body
pub fn preflight_response() -> Response<String> {
    let mut response = Response::new(String::new());
    *response.status_mut() = StatusCode::NO_CONTENT;

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));

    response
}

/// Header names and values as text; fails on any non-visible-ASCII value
fn header_pairs(headers: &HeaderMap) -> worker::Result<Vec<(&str, &str)>> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().map_err(|e| {
                worker::Error::RustError(format!("Invalid value for header {}: {}", name, e))
            })?;
            Ok((name.as_str(), value))
        })
        .collect()
}

/// Converts a built response into the runtime's response type
pub fn into_worker_response(response: Response<String>) -> worker::Result<worker::Response> {
    let (parts, body) = response.into_parts();

    let headers = Headers::new();
    for (name, value) in header_pairs(&parts.headers)? {
        headers.set(name, value)?;
    }

    let response = if body.is_empty() {
        worker::Response::empty()?
    } else {
        worker::Response::ok(body)?
    };

    Ok(response.with_status(parts.status.as_u16()).with_headers(headers))
}
