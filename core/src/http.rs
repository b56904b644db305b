//! HTTP exchange types shared by the client, the transport, and the
//! response processor.
//!
//! # Design
//! Requests and responses are plain data. `HalClient` builds an `HttpRequest`,
//! a `Transport` executes it and hands back an `HttpResponse` with the body
//! already buffered, and `ResponseProcessor` classifies that response without
//! touching the network. Tests can therefore script whole exchanges by
//! supplying `HttpResponse` values directly.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is always absolute; relative targets are resolved against the
/// client's base address before the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First value of the named header (case-insensitive name match).
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }

    /// Every value sent for the named header, in order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A fully buffered HTTP response.
///
/// The body is kept as raw bytes; decoding is left to the response processor
/// so that a payload which is not valid UTF-8 surfaces as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of the named header (case-insensitive name match).
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn first_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_name_case() {
        let response = HttpResponse::new(200)
            .with_header("Content-Type", "application/hal+json")
            .with_header("content-type", "text/plain");
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/hal+json"));
        assert_eq!(response.header("location"), None);
    }

    #[test]
    fn body_keeps_raw_bytes() {
        let response = HttpResponse::new(200).with_body(&b"caf\xe9"[..]);
        assert_eq!(response.body, vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(HttpResponse::new(200).with_body("{}").body, b"{}".to_vec());
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse::new(200).is_success());
        assert!(HttpResponse::new(299).is_success());
        assert!(!HttpResponse::new(199).is_success());
        assert!(!HttpResponse::new(302).is_success());
        assert!(!HttpResponse::new(500).is_success());
    }

    #[test]
    fn request_header_values_collects_duplicates() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/".to_string(),
            headers: vec![
                ("X-Trace".to_string(), "a".to_string()),
                ("accept".to_string(), "application/hal+json".to_string()),
                ("x-trace".to_string(), "b".to_string()),
            ],
            body: None,
        };
        assert_eq!(request.header_values("x-trace").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(request.header("Accept"), Some("application/hal+json"));
    }
}
