//! The network boundary.
//!
//! # Design
//! `HalClient` talks to the network only through the `Transport` trait, so a
//! caller can inject a preconfigured or scripted transport (see
//! `HalClientFactory::create_client`). `ReqwestTransport` is the production
//! implementation. It never follows redirects on its own: redirect chasing
//! belongs to the client so the hop bound and the GET conversion apply
//! uniformly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::trace;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP request and returns the buffered response.
///
/// Implementations must be shareable across concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
    max_response_buffer_size: u64,
}

impl ReqwestTransport {
    /// Build a transport whose timeout, user agent and body limit come from
    /// `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Wrap an existing reqwest client. The client should be built with
    /// `redirect::Policy::none()`, otherwise reqwest resolves redirects before
    /// the HAL client sees them.
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            timeout: config.timeout,
            max_response_buffer_size: config.max_response_buffer_size,
        }
    }

    fn map_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }

    fn too_large(&self) -> TransportError {
        TransportError::BodyTooLarge {
            limit: self.max_response_buffer_size,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let mut response = builder.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().map_err(|_| {
                    TransportError::InvalidHeader(format!("{name}: value is not visible ASCII"))
                })?;
                Ok((name.as_str().to_string(), value.to_string()))
            })
            .collect::<Result<Vec<_>, TransportError>>()?;

        if response
            .content_length()
            .is_some_and(|len| len > self.max_response_buffer_size)
        {
            return Err(self.too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_error(e))? {
            if (body.len() + chunk.len()) as u64 > self.max_response_buffer_size {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }
        trace!(status, bytes = body.len(), "response body buffered");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
