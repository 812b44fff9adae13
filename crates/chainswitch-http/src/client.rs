//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! One request per call, no retries: a failed call surfaces immediately and
//! marks the client unhealthy until the next success.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use chainswitch_core::error::TransportError;
use chainswitch_core::request::{JsonRpcRequest, JsonRpcResponse};
use chainswitch_core::transport::{HealthStatus, RpcTransport};

const HEALTH_UNKNOWN: u8 = 0;
const HEALTH_OK: u8 = 1;
const HEALTH_FAILED: u8 = 2;

/// Configuration for `HttpRpcClient` and the block trackers built next to it.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
    /// Interval between head-epoch polls.
    pub poll_interval: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(4),
        }
    }
}

/// Parse and check an endpoint URL. Only `http` and `https` are accepted.
pub fn parse_rpc_url(url: &str) -> Result<Url, TransportError> {
    let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(TransportError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// HTTP JSON-RPC client.
pub struct HttpRpcClient {
    url: Url,
    http: reqwest::Client,
    request_timeout: Duration,
    health: AtomicU8,
}

impl HttpRpcClient {
    /// Create a new client for the given JSON-RPC endpoint URL.
    pub fn new(url: &str, config: HttpClientConfig) -> Result<Self, TransportError> {
        let url = parse_rpc_url(url)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            url,
            http,
            request_timeout: config.request_timeout,
            health: AtomicU8::new(HEALTH_UNKNOWN),
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: &str) -> Result<Self, TransportError> {
        Self::new(url, HttpClientConfig::default())
    }

    fn record(&self, ok: bool) {
        let value = if ok { HEALTH_OK } else { HEALTH_FAILED };
        self.health.store(value, Ordering::Relaxed);
    }

    fn map_send_error(&self, e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            TransportError::Http(e.to_string())
        }
    }

    async fn post<B, R>(&self, body: &B) -> Result<R, TransportError>
    where
        B: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<R>()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let result = self.post::<_, JsonRpcResponse>(&req).await;
        self.record(result.is_ok());
        if let Err(e) = &result {
            tracing::debug!(method = %req.method, url = %self.url, error = %e, "request failed");
        }
        result
    }

    fn health(&self) -> HealthStatus {
        match self.health.load(Ordering::Relaxed) {
            HEALTH_OK => HealthStatus::Healthy,
            HEALTH_FAILED => HealthStatus::Unhealthy,
            _ => HealthStatus::Unknown,
        }
    }

    fn url(&self) -> String {
        self.url.to_string()
    }
}
