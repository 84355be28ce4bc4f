//! Response encoding.
//!
//! # Responsibilities
//! - Render a status code and JSON body as HTTP/1.1 bytes
//! - Stamp the HTCPCP identification headers on every response
//! - Provide the bodiless 400/500 responses used at the connection boundary
//!
//! # Design Decisions
//! - Bodies keep the key order they were built with (`preserve_order`)
//! - Every response closes the connection; there is no keep-alive

use serde_json::Value;
use thiserror::Error;

/// Headers identifying the protocol, sent on every response.
pub const PROTOCOL_HEADERS: [(&str, &str); 3] = [
    ("X-Protocol", "HTCPCP/1.0"),
    ("X-RFC", "RFC-2324, RFC-7168"),
    ("X-Powered-By", "Coffee"),
];

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Failure while rendering a response body.
#[derive(Debug, Error)]
#[error("failed to encode response body: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Reason phrase for a status code, `Unknown` for codes outside the table.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        418 => "I'm a Teapot",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A response produced by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: u16,
    body: Option<Value>,
}

impl Response {
    /// Response with a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Response without a body.
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn bad_request() -> Self {
        Self::empty(400)
    }

    pub fn internal_error() -> Self {
        Self::empty(500)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Pretty-printed body bytes; empty when there is no body.
    pub fn body_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        match &self.body {
            Some(body) => Ok(serde_json::to_vec_pretty(body)?),
            None => Ok(Vec::new()),
        }
    }

    /// Full HTTP/1.1 response bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let body = self.body_bytes()?;
        Ok(encode_raw(self.status, &body))
    }
}

/// Assemble head and body. Cannot fail, so it backs the 500 fallback.
pub fn encode_raw(status: u16, body: &[u8]) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {} {}\r\n", status, reason_phrase(status));
    head.push_str(&format!("Content-Type: {}\r\n", CONTENT_TYPE_JSON));
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    for (name, value) in PROTOCOL_HEADERS {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("Connection: close\r\n\r\n");

    let mut out = head.into_bytes();
    out.extend_from_slice(body);
    out
}
