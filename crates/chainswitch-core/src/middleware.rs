//! Middleware pipeline: an ordered stack of layers that either answer a
//! request or pass it on, plus the provider derived from such a stack.
//!
//! ```text
//! Provider::send → [base layer] → [network layer] → node
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::{HealthStatus, RpcTransport};

/// One layer of the pipeline.
#[async_trait]
pub trait RpcMiddleware: Send + Sync + 'static {
    /// Answer `req` directly or hand it to `next`.
    async fn handle(
        &self,
        req: JsonRpcRequest,
        next: Next<'_>,
    ) -> Result<JsonRpcResponse, TransportError>;
}

/// The remainder of the pipeline after the current layer.
pub struct Next<'a> {
    rest: &'a [Arc<dyn RpcMiddleware>],
}

impl<'a> Next<'a> {
    /// Run the remaining layers. Fails with [`TransportError::Unhandled`]
    /// when the stack is exhausted without a response.
    pub async fn run(self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        match self.rest.split_first() {
            Some((layer, rest)) => layer.handle(req, Next { rest }).await,
            None => Err(TransportError::Unhandled { method: req.method }),
        }
    }
}

/// An ordered middleware stack.
#[derive(Clone, Default)]
pub struct RpcEngine {
    stack: Vec<Arc<dyn RpcMiddleware>>,
}

impl RpcEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer; requests visit layers in push order.
    pub fn push(mut self, layer: Arc<dyn RpcMiddleware>) -> Self {
        self.stack.push(layer);
        self
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub async fn handle(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        Next { rest: &self.stack }.run(req).await
    }
}

/// Terminal layer that forwards every request to a transport.
pub struct TransportMiddleware {
    transport: Arc<dyn RpcTransport>,
}

impl TransportMiddleware {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }
}

#[async_trait]
impl RpcMiddleware for TransportMiddleware {
    async fn handle(
        &self,
        req: JsonRpcRequest,
        _next: Next<'_>,
    ) -> Result<JsonRpcResponse, TransportError> {
        self.transport.send(req).await
    }
}

/// The outward-facing provider derived from an [`RpcEngine`].
pub struct EngineProvider {
    engine: RpcEngine,
    rpc_url: String,
    health_source: Option<Arc<dyn RpcTransport>>,
}

impl EngineProvider {
    /// `rpc_url` identifies the endpoint behind the engine. `health_source`,
    /// when given, is consulted for [`RpcTransport::health`].
    pub fn new(
        engine: RpcEngine,
        rpc_url: impl Into<String>,
        health_source: Option<Arc<dyn RpcTransport>>,
    ) -> Self {
        Self {
            engine,
            rpc_url: rpc_url.into(),
            health_source,
        }
    }
}

#[async_trait]
impl RpcTransport for EngineProvider {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        self.engine.handle(req).await
    }

    fn health(&self) -> HealthStatus {
        self.health_source
            .as_ref()
            .map_or(HealthStatus::Unknown, |t| t.health())
    }

    fn url(&self) -> String {
        self.rpc_url.clone()
    }
}
