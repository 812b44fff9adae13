//! HTTP implementation of [`TransportFactory`].

use std::sync::Arc;

use chainswitch_core::error::TransportError;
use chainswitch_core::factory::{NetworkClient, TransportFactory};
use chainswitch_core::middleware::TransportMiddleware;
use chainswitch_core::transport::RpcTransport;

use crate::client::{HttpClientConfig, HttpRpcClient};
use crate::tracker::PollingBlockTracker;

/// Conventional address of a local development node.
pub const LOCALHOST_RPC_URL: &str = "http://localhost:12537";

/// Builds reqwest-backed clients with a polling block tracker each.
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    config: HttpClientConfig,
    localhost_url: String,
}

impl HttpTransportFactory {
    pub fn new(config: HttpClientConfig) -> Self {
        Self {
            config,
            localhost_url: LOCALHOST_RPC_URL.to_string(),
        }
    }

    /// Point [`TransportFactory::create_localhost_client`] somewhere else.
    pub fn with_localhost_url(mut self, url: impl Into<String>) -> Self {
        self.localhost_url = url.into();
        self
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn build(&self, rpc_url: &str) -> Result<NetworkClient, TransportError> {
        let client: Arc<dyn RpcTransport> =
            Arc::new(HttpRpcClient::new(rpc_url, self.config.clone())?);
        let tracker = PollingBlockTracker::new(Arc::clone(&client), self.config.poll_interval);

        tracing::debug!(url = rpc_url, "built http network client");
        Ok(NetworkClient {
            middleware: Arc::new(TransportMiddleware::new(Arc::clone(&client))),
            block_tracker: Arc::new(tracker),
            rpc_url: rpc_url.to_string(),
            transport: Some(client),
        })
    }
}

impl Default for HttpTransportFactory {
    fn default() -> Self {
        Self::new(HttpClientConfig::default())
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create_json_rpc_client(&self, rpc_url: &str) -> Result<NetworkClient, TransportError> {
        self.build(rpc_url)
    }

    fn create_localhost_client(&self) -> Result<NetworkClient, TransportError> {
        self.build(&self.localhost_url)
    }
}
