//! Transport Client Factory: builds the network-specific half of a provider.

use std::sync::Arc;

use crate::block::BlockSource;
use crate::error::TransportError;
use crate::middleware::RpcMiddleware;
use crate::transport::RpcTransport;

/// What a factory hands back for one network: the terminal middleware that
/// reaches the node, and a block-change source for the same endpoint.
#[derive(Clone)]
pub struct NetworkClient {
    pub middleware: Arc<dyn RpcMiddleware>,
    pub block_tracker: Arc<dyn BlockSource>,
    pub rpc_url: String,
    /// Transport behind `middleware`, used for health reporting.
    pub transport: Option<Arc<dyn RpcTransport>>,
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}

/// Constructs [`NetworkClient`]s. Construction is synchronous: the returned
/// client must be usable immediately.
pub trait TransportFactory: Send + Sync + 'static {
    /// Client for an arbitrary JSON-RPC endpoint (also used for presets).
    fn create_json_rpc_client(&self, rpc_url: &str) -> Result<NetworkClient, TransportError>;

    /// Client for the conventional local development node.
    fn create_localhost_client(&self) -> Result<NetworkClient, TransportError>;
}
