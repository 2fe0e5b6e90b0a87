//! Outbound HTTP client for the relay.
//!
//! This crate wraps a single configured `reqwest::Client` that is shared by
//! every request the relay makes. It focuses on:
//!
//! - Bounding the connection pool, the connect phase and the whole call
//! - Sending and receiving JSON bodies
//! - Classifying failures as transport errors, non-success statuses or
//!   undecodable bodies so callers can map them onto their own taxonomy
//!
//! The primary entry point is [`RelayClient`]. Build one with
//! [`RelayClient::new`] and issue calls with [`RelayClient::get_json`] and
//! [`RelayClient::post_json`].

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Connection pool and timeout bounds applied to every outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Upper bound for a whole call, including reading the response body.
    pub request_timeout_secs: u64,
    /// Upper bound for establishing the TCP connection.
    pub connect_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
            pool_max_idle_per_host: 10,
            pool_idle_timeout_secs: 30,
        }
    }
}

/// Failure of a single outbound call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout or a broken body stream.
    #[error("request to {url} failed: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The peer answered with a status other than 200.
    #[error("{url} responded with HTTP {status}: {body}")]
    Status { url: String, status: StatusCode, body: String },

    /// The peer answered 200 but the body was not the expected JSON.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn url(&self) -> &str {
        match self {
            Self::Unreachable { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => url,
        }
    }

    /// The response status, when the peer answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client`.
///
/// Cloning is cheap and shares the underlying connection pool.
pub struct RelayClient {
    http: Client,
    user_agent: String,
}

impl RelayClient {
    /// Build a client honouring the pool and timeout bounds in `settings`.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(settings.pool_idle_timeout_secs))
            .build()
            .context("build http client")?;

        Ok(Self {
            http,
            user_agent: format!("extrelay/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// GET `url` and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|source| unreachable(url, source))?;
        let text = read_success_body(url, response).await?;
        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// POST `body` as JSON to `url`. The acknowledgement body is read and discarded.
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(), ApiError> {
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .header(header::USER_AGENT, &self.user_agent)
            .json(body)
            .send()
            .await
            .map_err(|source| unreachable(url, source))?;
        read_success_body(url, response).await.map(|_| ())
    }
}

fn unreachable(url: &str, source: reqwest::Error) -> ApiError {
    ApiError::Unreachable {
        url: url.to_string(),
        source,
    }
}

/// Drain the body, turning any status other than 200 into [`ApiError::Status`].
async fn read_success_body(url: &str, response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(|source| unreachable(url, source))?;
    if status != StatusCode::OK {
        debug!(%url, %status, body = %text, "non-success response");
        return Err(ApiError::Status {
            url: url.to_string(),
            status,
            body: text,
        });
    }
    Ok(text)
}
