//! Client configuration.
//!
//! A `ClientConfig` is fixed once a client is built. To change a setting,
//! derive a new client with `HalClient::reconfigure`.

use std::time::Duration;

use url::Url;

use crate::error::{HalError, Result};

/// HAL client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address relative request URIs are resolved against.
    pub base_url: Option<Url>,
    /// Headers sent with every request. `Accept` entries are ignored; the
    /// client always sends `Accept: application/hal+json`.
    pub default_headers: Vec<(String, String)>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Largest response body, in bytes, the transport will buffer.
    pub max_response_buffer_size: u64,
    /// Redirect hops followed before giving up with `RedirectLoop`.
    pub max_redirects: usize,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_headers: Vec::new(),
            timeout: Duration::from_secs(100),
            max_response_buffer_size: i32::MAX as u64,
            max_redirects: 10,
            user_agent: format!("hal-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Start a builder from a copy of this configuration.
    pub fn to_builder(&self) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: self.clone(),
        }
    }

    /// Resolve `uri` against the base address. Absolute URIs pass through.
    pub fn resolve(&self, uri: &str) -> Result<Url> {
        match Url::parse(uri) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base
                    .join(uri)
                    .map_err(|e| HalError::InvalidUri(format!("{uri}: {e}"))),
                None => Err(HalError::InvalidUri(format!(
                    "{uri}: relative URI and no base address configured"
                ))),
            },
            Err(e) => Err(HalError::InvalidUri(format!("{uri}: {e}"))),
        }
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: Url) -> Self {
        self.config.base_url = Some(url);
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_response_buffer_size(mut self, bytes: u64) -> Self {
        self.config.max_response_buffer_size = bytes;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
