//! HAL client: verb operations, redirect chasing, and client lifecycle.
//!
//! # Design
//! `HalClient` owns an immutable `ClientConfig`, a shared `Transport`, and a
//! `ResponseProcessor`. Every verb call rebuilds its header list from the
//! configuration, so the `Accept` header is always exactly
//! `application/hal+json` no matter what the default headers say.
//!
//! Redirects are followed in a bounded loop rather than by re-entering the
//! verb: each hop is a GET against the `Location` resolved relative to the
//! URL that produced the redirect, and the loop gives up with
//! `HalError::RedirectLoop` after `max_redirects` hops.
//!
//! The client is `Send + Sync`; share it behind an `Arc` for concurrent calls.
//! Calls never observe each other except through the transport.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::error::{HalError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::parser::{HalJsonParser, Parser};
use crate::processor::{Processed, ResponseProcessor, HAL_JSON};
use crate::resource::RootResourceObject;
use crate::transport::{ReqwestTransport, Transport};

const JSON: &str = "application/json";

/// Creates `HalClient`s that share a configuration and a parser.
#[derive(Clone)]
pub struct HalClientFactory {
    config: ClientConfig,
    parser: Arc<dyn Parser>,
}

impl HalClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            parser: Arc::new(HalJsonParser),
        }
    }

    /// Replace the default `HalJsonParser`.
    pub fn with_parser(mut self, parser: Arc<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a client. With `None`, a `ReqwestTransport` is built from the
    /// factory's configuration; otherwise the supplied transport is used
    /// as-is.
    pub fn create_client(&self, transport: Option<Arc<dyn Transport>>) -> Result<HalClient> {
        let injected = transport.is_some();
        let transport = match transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };
        Ok(HalClient {
            config: Arc::new(self.config.clone()),
            parser: Arc::clone(&self.parser),
            processor: ResponseProcessor::new(Arc::clone(&self.parser)),
            transport: RwLock::new(Some(transport)),
            injected,
            root: Mutex::new(None),
        })
    }
}

impl Default for HalClientFactory {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl fmt::Debug for HalClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalClientFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Client for `application/hal+json` APIs.
pub struct HalClient {
    config: Arc<ClientConfig>,
    parser: Arc<dyn Parser>,
    processor: ResponseProcessor,
    transport: RwLock<Option<Arc<dyn Transport>>>,
    /// The transport came from the caller rather than from the configuration.
    injected: bool,
    root: Mutex<Option<RootResourceObject>>,
}

impl HalClient {
    /// Client with a `ReqwestTransport` and the default parser.
    pub fn new(config: ClientConfig) -> Result<Self> {
        HalClientFactory::new(config).create_client(None)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a new client from a modified copy of this client's
    /// configuration, sharing the parser; this client is left untouched.
    ///
    /// A transport that was injected through `create_client` is shared with
    /// the new client, so transport-level settings (timeout, buffer limit)
    /// stay whatever that transport enforces. Otherwise the new client gets
    /// its own `ReqwestTransport` built from the new configuration.
    pub fn reconfigure(
        &self,
        configure: impl FnOnce(ClientConfigBuilder) -> ClientConfigBuilder,
    ) -> Result<HalClient> {
        let transport = self.transport()?;
        let config = configure(self.config.to_builder()).build();
        HalClientFactory::new(config)
            .with_parser(Arc::clone(&self.parser))
            .create_client(self.injected.then_some(transport))
    }

    pub async fn get(&self, uri: &str) -> Result<RootResourceObject> {
        let url = self.config.resolve(uri)?;
        self.execute(HttpMethod::Get, url, None).await
    }

    /// POST `data` serialized as JSON.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        uri: &str,
        data: &T,
    ) -> Result<RootResourceObject> {
        let url = self.config.resolve(uri)?;
        let body = to_json_body(data)?;
        self.execute(HttpMethod::Post, url, Some(body)).await
    }

    /// PUT `data` serialized as JSON.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        uri: &str,
        data: &T,
    ) -> Result<RootResourceObject> {
        let url = self.config.resolve(uri)?;
        let body = to_json_body(data)?;
        self.execute(HttpMethod::Put, url, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<RootResourceObject> {
        let url = self.config.resolve(uri)?;
        self.execute(HttpMethod::Delete, url, None).await
    }

    /// Opaque slot for a previously fetched root resource. Nothing in the
    /// client reads or fills it.
    pub fn root(&self) -> Option<RootResourceObject> {
        self.root.lock().clone()
    }

    pub fn set_root(&self, root: Option<RootResourceObject>) {
        *self.root.lock() = root;
    }

    /// Release the transport. Returns `false` if it was already released.
    /// Calls already in flight keep their handle and finish normally.
    pub fn dispose(&self) -> bool {
        let released = self.transport.write().take().is_some();
        if released {
            debug!("HAL client disposed");
        }
        released
    }

    pub fn is_disposed(&self) -> bool {
        self.transport.read().is_none()
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        self.transport.read().clone().ok_or(HalError::ClientDisposed)
    }

    async fn execute(
        &self,
        mut method: HttpMethod,
        mut url: Url,
        mut body: Option<String>,
    ) -> Result<RootResourceObject> {
        let transport = self.transport()?;
        let mut redirects = 0;

        loop {
            let request = self.build_request(method, &url, body.take());
            debug!(%method, %url, "sending request");
            let response = transport.send(request).await?;
            debug!(%method, %url, status = response.status, "received response");

            match self.processor.process(response)? {
                Processed::Root(root) => return Ok(root),
                Processed::Redirect { status, location } => {
                    if redirects >= self.config.max_redirects {
                        warn!(%url, max = self.config.max_redirects, "too many redirects");
                        return Err(HalError::RedirectLoop {
                            max: self.config.max_redirects,
                        });
                    }
                    redirects += 1;
                    url = url
                        .join(&location)
                        .map_err(|e| HalError::InvalidUri(format!("{location}: {e}")))?;
                    method = HttpMethod::Get;
                    debug!(status, %url, redirects, "following redirect");
                }
            }
        }
    }

    fn build_request(&self, method: HttpMethod, url: &Url, body: Option<String>) -> HttpRequest {
        let mut headers: Vec<(String, String)> = self
            .config
            .default_headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("accept"))
            .cloned()
            .collect();
        headers.push(("Accept".to_string(), HAL_JSON.to_string()));

        if body.is_some() {
            headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
            headers.push(("Content-Type".to_string(), JSON.to_string()));
        }

        HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        }
    }
}

impl fmt::Debug for HalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalClient")
            .field("config", &self.config)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

fn to_json_body<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    serde_json::to_string(data).map_err(|e| HalError::Serialization(e.to_string()))
}
