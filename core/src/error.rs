//! Error types for the HAL client.
//!
//! # Design
//! Each failure mode of a verb call gets its own variant so callers can tell
//! "the server said no" (`HttpStatus`) apart from "the server answered in a
//! format we cannot read" (`UnsupportedResponse`) and "the HAL body was
//! broken" (`Parse`). Transport and parse errors keep their own enums and are
//! wrapped unchanged.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type for HAL client operations.
pub type Result<T> = std::result::Result<T, HalError>;

/// Errors returned by `HalClient` verb operations.
#[derive(Debug, Error)]
pub enum HalError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-2xx status without a HAL body.
    #[error("HTTP {status}: response status does not indicate success")]
    HttpStatus { status: u16 },

    /// A 2xx response whose `Content-Type` is not `application/hal+json`.
    #[error("unsupported response: {0}")]
    UnsupportedResponse(ContentTypeProblem),

    /// The HAL body could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The redirect chain did not settle within the configured hop count.
    #[error("redirect limit of {max} exceeded")]
    RedirectLoop { max: usize },

    /// A 302/303/307 response arrived without a `Location` header.
    #[error("HTTP {status} redirect is missing the 'Location' header")]
    MissingLocation { status: u16 },

    /// The client was disposed before the call was made.
    #[error("client has been disposed")]
    ClientDisposed,

    /// The target or redirect URI could not be resolved to an absolute URL.
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl HalError {
    /// Status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status } | Self::MissingLocation { status } => Some(*status),
            _ => None,
        }
    }
}

/// Why a response's `Content-Type` was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeProblem {
    Missing,
    Unsupported(String),
}

impl fmt::Display for ContentTypeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentTypeProblem::Missing => {
                write!(f, "the response is missing the 'Content-Type' header")
            }
            ContentTypeProblem::Unsupported(value) => write!(
                f,
                "the response contains an unsupported 'Content-Type' header value: {value}"
            ),
        }
    }
}

/// Failures raised below the HTTP layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection error: {0}")]
    Connect(String),

    /// The response body exceeded `ClientConfig::max_response_buffer_size`.
    #[error("response body exceeds the buffer limit of {limit} bytes")]
    BodyTooLarge { limit: u64 },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("{0}")]
    Other(String),
}

/// Failures raised by a `Parser`.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The payload bytes are not valid UTF-8.
    #[error("response body is not valid UTF-8: {0}")]
    InvalidUtf8(std::str::Utf8Error),

    /// The payload is not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document root is not a JSON object.
    #[error("HAL document must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("invalid '_links' member: {0}")]
    InvalidLinks(String),

    #[error("invalid '_embedded' member: {0}")]
    InvalidEmbedded(String),
}
