//! HTTP plumbing between the client and the chat proxy.
//!
//! [`Transport`] is the seam the client dispatches through.  [`HttpTransport`]
//! talks to the local proxy (`POST /api/chat`, `GET /api/health`); tests
//! substitute scripted implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use url::Url;

use crate::error::{Error, Result};
use crate::message::ChatRequest;

pub const DEFAULT_CHAT_PATH: &str = "/api/chat";
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// A successful HTTP response, body read as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Sends chat requests to the backend.
///
/// Implementations return `Ok` only for successful (2xx) responses and map
/// every other outcome to an [`Error`].  Per-attempt timeouts are enforced by
/// the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one chat request.
    async fn post_chat(&self, request: &ChatRequest) -> Result<RawResponse>;

    /// Probes backend liveness.
    async fn health(&self) -> Result<()>;
}

/// [`Transport`] over HTTP using reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    chat_url: Url,
    health_url: Url,
    health_timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport for a proxy rooted at `base_url`, using the default paths.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        Self::with_options(
            base_url,
            DEFAULT_CHAT_PATH,
            DEFAULT_HEALTH_PATH,
            user_agent,
            DEFAULT_HEALTH_TIMEOUT,
        )
    }

    /// Create a new transport with custom settings.
    pub fn with_options(
        base_url: &str,
        chat_path: &str,
        health_path: &str,
        user_agent: &str,
        health_timeout: Duration,
    ) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let chat_url = base.join(chat_path)?;
        let health_url = base.join(health_path)?;
        let client = ReqwestClient::builder()
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self {
            client,
            chat_url,
            health_url,
            health_timeout,
        })
    }

    /// Creates a transport around a preconfigured reqwest client, using the default paths.
    pub fn with_client(client: ReqwestClient, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        Ok(Self {
            client,
            chat_url: base.join(DEFAULT_CHAT_PATH)?,
            health_url: base.join(DEFAULT_HEALTH_PATH)?,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    /// Headers sent with JSON chat requests.
    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "x-requested-with",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers
    }

    /// Converts an unsuccessful response into our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("");
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return send_error(e),
        };
        let message = if body.trim().is_empty() {
            reason.to_string()
        } else {
            body
        };
        log::warn!("chat proxy returned {status}: {message}");
        error_for_status(status.as_u16(), message)
    }
}

/// Maps an unsuccessful status and its body to an [`Error`].
pub fn error_for_status(status_code: u16, message: String) -> Error {
    match status_code {
        404 => Error::not_found(message),
        502 => Error::bad_gateway(message),
        _ if message.contains("CORS") => Error::cors(message),
        _ => Error::api(status_code, message),
    }
}

fn send_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::timeout(format!("{}", e), None)
    } else if is_connectivity(&e) {
        Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
    } else {
        Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
    }
}

/// Whether the exchange broke below HTTP: refused, reset, or closed mid-message.
fn is_connectivity(e: &reqwest::Error) -> bool {
    if e.status().is_some() || e.is_builder() || e.is_decode() || e.is_redirect() {
        return false;
    }
    e.is_connect() || e.is_request() || e.is_body() || has_io_source(e)
}

fn has_io_source(e: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = e.source();
    while let Some(err) = source {
        if err.is::<std::io::Error>() {
            return true;
        }
        source = err.source();
    }
    false
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_chat(&self, request: &ChatRequest) -> Result<RawResponse> {
        let builder = self.client.post(self.chat_url.clone());
        let builder = if request.is_multipart() {
            log::debug!(
                "sending {} photo(s) as multipart to {}",
                request.attachments().len(),
                self.chat_url
            );
            builder.multipart(request.multipart_form()?)
        } else {
            log::debug!("sending JSON to {}", self.chat_url);
            builder
                .headers(Self::json_headers())
                .json(request.payload())
        };

        let response = builder.send().await.map_err(send_error)?;
        let status = response.status();
        log::debug!("chat proxy status: {status}");
        if !status.is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.text().await.map_err(send_error)?;
        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }

    async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(self.health_url.clone())
            .header("x-requested-with", "XMLHttpRequest")
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(send_error)?;
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(())
    }
}
