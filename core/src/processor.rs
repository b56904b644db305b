//! Classification of a single HTTP response.
//!
//! # Design
//! `ResponseProcessor` never performs I/O. It looks at one buffered response
//! and decides whether the client has to follow a redirect, whether the body
//! is HAL and can be parsed, or which error the caller should see. The
//! redirect itself is issued by `HalClient`, which keeps the hop count.
//!
//! Order of checks:
//! 1. 302/303/307 are redirects, whatever the body says.
//! 2. A HAL `Content-Type` wins next: 204 yields no resource, anything else is
//!    parsed, including 4xx/5xx error documents.
//! 3. Otherwise a non-2xx status is reported as `HttpStatus` before the
//!    content type is blamed.

use std::sync::Arc;

use crate::error::{ContentTypeProblem, HalError, ParseError, Result};
use crate::http::HttpResponse;
use crate::parser::Parser;
use crate::resource::RootResourceObject;

pub const HAL_JSON: &str = "application/hal+json";

const FOUND: u16 = 302;
const SEE_OTHER: u16 = 303;
const TEMPORARY_REDIRECT: u16 = 307;
const NO_CONTENT: u16 = 204;

/// What to do with a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Processed {
    /// Re-issue the request as a GET against `location`.
    Redirect { status: u16, location: String },
    /// The exchange is complete.
    Root(RootResourceObject),
}

/// Turns one raw response into a `Processed` outcome.
#[derive(Clone)]
pub struct ResponseProcessor {
    parser: Arc<dyn Parser>,
}

impl ResponseProcessor {
    pub fn new(parser: Arc<dyn Parser>) -> Self {
        Self { parser }
    }

    /// Consumes the response; its body is read at most once.
    pub fn process(&self, response: HttpResponse) -> Result<Processed> {
        let status = response.status;

        if is_redirect(status) {
            let location = response
                .header("location")
                .ok_or(HalError::MissingLocation { status })?;
            return Ok(Processed::Redirect {
                status,
                location: location.trim().to_string(),
            });
        }

        let content_type = response.header("content-type").map(str::to_string);
        if content_type.as_deref().is_some_and(is_hal_json) {
            if status == NO_CONTENT {
                return Ok(Processed::Root(RootResourceObject::NoContent { status }));
            }
            let text = std::str::from_utf8(&response.body).map_err(ParseError::InvalidUtf8)?;
            let resource = self.parser.parse(text)?;
            return Ok(Processed::Root(RootResourceObject::Resource { status, resource }));
        }

        if !response.is_success() {
            return Err(HalError::HttpStatus { status });
        }

        Err(HalError::UnsupportedResponse(match content_type {
            Some(value) => ContentTypeProblem::Unsupported(value),
            None => ContentTypeProblem::Missing,
        }))
    }
}

fn is_redirect(status: u16) -> bool {
    matches!(status, FOUND | SEE_OTHER | TEMPORARY_REDIRECT)
}

/// Only the first value of a comma-separated header is considered.
fn is_hal_json(value: &str) -> bool {
    value
        .split(',')
        .next()
        .is_some_and(|first| first.trim().eq_ignore_ascii_case(HAL_JSON))
}
