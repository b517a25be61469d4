//! HTTP capability used by the fetcher
//!
//! The fetcher only needs a conditional GET. Redirects, TLS and timeouts
//! belong to the client implementation.

use crate::error::{CdnError, CdnResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Validators attached to a conditional GET
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalHeaders {
    /// `If-None-Match` value (a previously stored ETag)
    pub if_none_match: Option<String>,
}

impl ConditionalHeaders {
    /// Headers carrying an optional ETag
    pub fn with_etag(etag: Option<String>) -> Self {
        Self {
            if_none_match: etag,
        }
    }
}

/// The parts of an HTTP response the fetcher cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Response body (empty for 304)
    pub body: Vec<u8>,
    /// `ETag` response header, if any
    pub etag: Option<String>,
}

impl HttpResponse {
    /// A 200 response with a body and optional ETag
    pub fn ok(body: impl Into<Vec<u8>>, etag: Option<&str>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            etag: etag.map(str::to_string),
        }
    }

    /// A 304 response
    pub fn not_modified() -> Self {
        Self::status(304)
    }

    /// A bodiless response with the given status
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            etag: None,
        }
    }
}

/// Abstract HTTP GET interface
///
/// Implementations must return non-2xx statuses as responses rather than
/// errors; `Err` is reserved for transport failures.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request for `url`
    async fn get(&self, url: &str, conditional: &ConditionalHeaders) -> CdnResult<HttpResponse>;
}

/// Blocking `ureq` agent driven from the tokio blocking pool
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Create a client with a global request timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .user_agent(user_agent)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

#[async_trait]
impl HttpClient for UreqClient {
    async fn get(&self, url: &str, conditional: &ConditionalHeaders) -> CdnResult<HttpResponse> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let etag = conditional.if_none_match.clone();

        tokio::task::spawn_blocking(move || get_blocking(&agent, &url, etag.as_deref()))
            .await
            .map_err(|e| CdnError::Internal(format!("HTTP worker failed: {}", e)))?
    }
}

fn get_blocking(agent: &ureq::Agent, url: &str, etag: Option<&str>) -> CdnResult<HttpResponse> {
    let http_error = |e: ureq::Error| CdnError::Http {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let mut request = agent.get(url);
    if let Some(etag) = etag {
        request = request.header("If-None-Match", etag);
    }

    let mut response = request.call().map_err(http_error)?;
    let status = response.status().as_u16();
    let etag = response
        .headers()
        .get("etag")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let body = if status == 304 {
        Vec::new()
    } else {
        response.body_mut().read_to_vec().map_err(http_error)?
    };

    debug!("GET {} -> {} ({} bytes)", url, status, body.len());

    Ok(HttpResponse { status, body, etag })
}
