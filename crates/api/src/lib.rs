//! HTTP client utilities for address providers.
//!
//! This crate provides a lightweight client shared by every provider adapter.
//! It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating provider base URLs before any request is made
//! - Building requests with a consistent User-Agent and Accept headers
//! - Classifying failures into [`FetchError`] so callers can log them
//!
//! The primary entry point is [`ProviderClient`]. Create an instance via
//! [`ProviderClient::new`], then fetch a typed payload with
//! [`ProviderClient::get_json`].
//!
//! # Example
//!
//! ```ignore
//! use ceprace_api::{ProviderClient, path_segment};
//!
//! async fn run() -> Result<(), ceprace_api::FetchError> {
//!     let client = ProviderClient::new("https://brasilapi.com.br")?;
//!     let body: serde_json::Value = client
//!         .get_json(&format!("/api/cep/v1/{}", path_segment("01153000")))
//!         .await?;
//!     println!("{body}");
//!     Ok(())
//! }
//! ```

use std::env;
use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Characters escaped when a key is placed in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Failure of a single provider request.
///
/// The variants only exist so logs can say what went wrong; the race engine
/// treats all of them the same way.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: StatusCode },

    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider reported no address for '{key}'")]
    NotFound { key: String },
}

impl FetchError {
    fn invalid_base_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for one provider.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL. It carries no overall request timeout: requests are
/// bounded by the race that owns them, which drops the future on cancellation.
pub struct ProviderClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl ProviderClient {
    /// Construct a [`ProviderClient`] for `base_url`.
    ///
    /// A trailing slash on the base URL is ignored.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("ceprace/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a `reqwest::RequestBuilder` for a method and provider-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    /// GET `path` and decode a successful JSON body into `T`.
    ///
    /// Any non-2xx status is an error; the body of such responses is not read.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Percent-encode `value` for use as exactly one URL path segment.
pub fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - it must parse as an absolute URL with a host
/// - the scheme must be `http` or `https`
/// - it must not carry a query string or fragment
pub fn validate_base_url(base: &str) -> Result<(), FetchError> {
    let parsed = Url::parse(base).map_err(|e| FetchError::invalid_base_url(base, e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::invalid_base_url(
            base,
            format!("scheme must be http or https; got '{}://'", parsed.scheme()),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(FetchError::invalid_base_url(base, "URL must include a host"));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(FetchError::invalid_base_url(base, "query strings and fragments are not allowed"));
    }

    Ok(())
}
