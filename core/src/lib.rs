//! Async client for HAL (`application/hal+json`) REST APIs.
//!
//! # Overview
//! `HalClient` issues GET/POST/PUT/DELETE requests with
//! `Accept: application/hal+json`, follows 302/303/307 redirects as GETs, and
//! turns the final response into a `RootResourceObject`: the HTTP status plus,
//! when a HAL body was returned, a `ResourceObject` graph of properties,
//! `_links` and `_embedded` resources.
//!
//! # Design
//! - The network sits behind the `Transport` trait (`ReqwestTransport` by
//!   default); a scripted transport can be injected through
//!   `HalClientFactory::create_client`.
//! - `ResponseProcessor` classifies one buffered response without I/O.
//! - JSON parsing sits behind the `Parser` trait (`HalJsonParser` by default).
//! - Configuration is immutable once a client exists.
//!
//! ```rust,no_run
//! use hal_client::{ClientConfig, HalClient, Url};
//!
//! # async fn run() -> hal_client::Result<()> {
//! let config = ClientConfig::builder()
//!     .base_url(Url::parse("https://api.example.com/").unwrap())
//!     .build();
//! let client = HalClient::new(config)?;
//!
//! let root = client.get("/orders").await?;
//! if let Some(orders) = root.resource() {
//!     for link in orders.links_for("item").into_iter().flatten() {
//!         println!("{}", link.href);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod parser;
pub mod processor;
pub mod resource;
pub mod transport;

pub use client::{HalClient, HalClientFactory};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ContentTypeProblem, HalError, ParseError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use parser::{HalJsonParser, Parser};
pub use processor::{Processed, ResponseProcessor, HAL_JSON};
pub use resource::{Link, OneOrMany, ResourceObject, RootResourceObject};
pub use transport::{ReqwestTransport, Transport};

pub use url::Url;
