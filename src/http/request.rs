//! Request parsing.
//!
//! # Responsibilities
//! - Split raw bytes into head and body
//! - Tokenize the request line into method and path
//! - Collect headers into a case-insensitive map
//!
//! # Design Decisions
//! - Any uppercase-able token is a method; there is no allowlist, so the
//!   HTCPCP verbs (BREW, WHEN, PROPFIND) parse like GET
//! - Invalid UTF-8 is replaced, never rejected
//! - Failures are values ([`ParseError`]); the connection answers 400

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

/// Separator between request head and body.
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Unique identifier attached to each parsed request for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a request could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty request")]
    Empty,

    #[error("malformed request line: {0:?}")]
    RequestLine(String),
}

/// Request headers with lowercased names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any earlier value for the same name.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.inner
            .insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    /// Look up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Headers {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// A request as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// Uppercased method token.
    pub method: String,
    /// Request target without its query string.
    pub path: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl ParsedRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: strip_query(path).to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Position of the first CRLFCRLF in `buf`.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}

fn strip_query(target: &str) -> &str {
    target.split_once('?').map_or(target, |(path, _)| path)
}

/// Parse raw request bytes (head and optional body).
pub fn parse_request(raw: &[u8]) -> Result<ParsedRequest, ParseError> {
    let (head, body) = match find_head_end(raw) {
        Some(end) => (&raw[..end], &raw[end + HEAD_TERMINATOR.len()..]),
        None => (raw, &[][..]),
    };
    if head.is_empty() {
        return Err(ParseError::Empty);
    }

    let head = String::from_utf8_lossy(head);
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();

    let mut tokens = request_line.split(' ');
    let (method, target) = match (tokens.next(), tokens.next()) {
        (Some(method), Some(target)) if !method.is_empty() => (method, target),
        _ => return Err(ParseError::RequestLine(request_line.to_string())),
    };

    let headers = lines
        .filter_map(|line| line.split_once(": "))
        .collect::<Headers>();

    Ok(ParsedRequest {
        method: method.to_ascii_uppercase(),
        path: strip_query(target).to_string(),
        headers,
        body: body.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_method() {
        let req = parse_request(
            b"brew /coffee/pot-1 HTTP/1.1\r\nHost: localhost\r\nAccept-Additions: milk-type=Cream\r\n\r\n",
        )
        .unwrap();
        assert_eq!(req.method, "BREW");
        assert_eq!(req.path, "/coffee/pot-1");
        assert_eq!(req.headers.get("accept-additions"), Some("milk-type=Cream"));
        assert_eq!(req.headers.get("HOST"), Some("localhost"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_query_string_discarded() {
        let req = parse_request(b"GET /coffee/pot-1/status?verbose=1&x=2 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "/coffee/pot-1/status");
    }

    #[test]
    fn test_body_after_blank_line() {
        let req = parse_request(b"POST /coffee/pot-1 HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").unwrap();
        assert_eq!(req.body, b"hello");
    }

    #[test]
    fn test_missing_terminator_is_all_head() {
        let req = parse_request(b"WHEN /coffee/pot-1/stop-milk HTTP/1.1\r\nX-A: 1").unwrap();
        assert_eq!(req.method, "WHEN");
        assert_eq!(req.headers.get("x-a"), Some("1"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_http09_style_line_accepted() {
        let req = parse_request(b"GET /\r\n\r\n").unwrap();
        assert_eq!(req.path, "/");
    }

    #[test]
    fn test_later_duplicate_header_wins() {
        let req = parse_request(b"GET / HTTP/1.1\r\nX-Dup: first\r\nx-dup:   second  \r\n\r\n").unwrap();
        assert_eq!(req.headers.get("x-dup"), Some("second"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn test_headers_iterate_lowercased() {
        let req = parse_request(b"GET / HTTP/1.1\r\nHost: pot\r\nAccept-Additions: milk-type=Skim\r\n\r\n").unwrap();
        let mut pairs: Vec<(&str, &str)> = req.headers.iter().collect();
        pairs.sort_unstable();
        assert_eq!(pairs, [("accept-additions", "milk-type=Skim"), ("host", "pot")]);
    }

    #[test]
    fn test_lines_without_colon_space_ignored() {
        let req = parse_request(b"GET / HTTP/1.1\r\nNoSpace:value\r\ngarbage\r\nOk: yes\r\n\r\n").unwrap();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers.get("ok"), Some("yes"));
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let req = parse_request(b"GET / HTTP/1.1\r\nX-Bin: caf\xe9\r\n\r\n").unwrap();
        assert_eq!(req.headers.get("x-bin"), Some("caf\u{fffd}"));
    }

    #[test]
    fn test_malformed_request_lines() {
        assert_eq!(parse_request(b""), Err(ParseError::Empty));
        assert_eq!(parse_request(b"\r\n\r\n"), Err(ParseError::Empty));
        assert!(matches!(parse_request(b"GET\r\n\r\n"), Err(ParseError::RequestLine(_))));
        assert!(matches!(parse_request(b" /path HTTP/1.1\r\n\r\n"), Err(ParseError::RequestLine(_))));
    }

    #[test]
    fn test_find_head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n\r\nbody"), Some(14));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n"), None);
    }

    #[test]
    fn test_request_ids_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
