//! The fixed first layer of every provider pipeline.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use chainswitch_core::error::TransportError;
use chainswitch_core::middleware::{Next, RpcMiddleware};
use chainswitch_core::request::{JsonRpcRequest, JsonRpcResponse};

fn default_client_version() -> String {
    format!("ChainSwitch/v{}", env!("CARGO_PKG_VERSION"))
}

/// Parameters of the base layer, supplied once at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseParams {
    /// Answer to `web3_clientVersion`.
    pub client_version: String,
    /// Methods answered locally with a fixed result.
    pub static_results: BTreeMap<String, Value>,
}

impl Default for BaseParams {
    fn default() -> Self {
        Self {
            client_version: default_client_version(),
            static_results: BTreeMap::new(),
        }
    }
}

/// Answers client-local methods; everything else goes to the network layer.
#[derive(Debug, Clone)]
pub struct BaseMiddleware {
    params: BaseParams,
}

impl BaseMiddleware {
    pub fn new(params: BaseParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BaseParams {
        &self.params
    }

    fn local_result(&self, method: &str) -> Option<Value> {
        if method == "web3_clientVersion" {
            return Some(json!(self.params.client_version));
        }
        self.params.static_results.get(method).cloned()
    }
}

#[async_trait]
impl RpcMiddleware for BaseMiddleware {
    async fn handle(
        &self,
        req: JsonRpcRequest,
        next: Next<'_>,
    ) -> Result<JsonRpcResponse, TransportError> {
        match self.local_result(&req.method) {
            Some(result) => Ok(JsonRpcResponse::success(req.id, result)),
            None => next.run(req).await,
        }
    }
}
