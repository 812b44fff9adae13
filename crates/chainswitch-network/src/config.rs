//! Controller options.

use serde::{Deserialize, Serialize};

use chainswitch_core::types::{NetworkType, ProviderConfig};

use crate::base::BaseParams;

/// Options a [`NetworkController`](crate::NetworkController) is built from.
///
/// ```json
/// { "provider": { "type": "rpc", "rpcUrl": "http://x", "chainId": "7" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// Persisted provider configuration; mainnet when absent.
    pub provider: Option<ProviderConfig>,
    /// Parameters of the base middleware layer.
    pub base: BaseParams,
}

impl NetworkOptions {
    /// Options whose provider type is chosen from the environment
    /// (see [`default_network_type`]).
    pub fn from_env() -> Self {
        Self {
            provider: Some(ProviderConfig::builtin(default_network_type())),
            base: BaseParams::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The provider configuration to start with.
    pub fn provider_config(&self) -> ProviderConfig {
        self.provider.clone().unwrap_or_default()
    }
}

/// Default network type for the current process:
///
/// | variable                 | type        |
/// |--------------------------|-------------|
/// | `IN_TEST=true`           | `localhost` |
/// | `CHAINSWITCH_DEBUG` set  | `testnet`   |
/// | `CHAINSWITCH_ENV=test`   | `localhost` |
/// | otherwise                | `mainnet`   |
pub fn default_network_type() -> NetworkType {
    resolve_default_type(|key| std::env::var(key).ok())
}

fn resolve_default_type(var: impl Fn(&str) -> Option<String>) -> NetworkType {
    if var("IN_TEST").as_deref() == Some("true") {
        NetworkType::Localhost
    } else if var("CHAINSWITCH_DEBUG").is_some() {
        NetworkType::Testnet
    } else if var("CHAINSWITCH_ENV").as_deref() == Some("test") {
        NetworkType::Localhost
    } else {
        NetworkType::Mainnet
    }
}
