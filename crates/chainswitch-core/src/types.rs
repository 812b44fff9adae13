//! Network domain types: provider configuration, identity, settings.

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::store::Merge;

/// Ticker used when a configuration does not name one.
pub const DEFAULT_TICKER: &str = "CFX";

/// Literal identity value while the network is unknown.
pub const LOADING: &str = "loading";

// ─── NetworkType ─────────────────────────────────────────────────────────────

/// The category of network a provider configuration points at.
///
/// Unrecognized strings are kept verbatim in [`NetworkType::Unknown`] so that
/// externally persisted configurations round-trip and can be rejected with a
/// message naming the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Localhost,
    /// Arbitrary RPC endpoint supplied by the user.
    Rpc,
    Unknown(String),
}

impl NetworkType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Localhost => "localhost",
            Self::Rpc => "rpc",
            Self::Unknown(other) => other,
        }
    }

    /// Types with fixed, built-in connection facts.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Mainnet | Self::Testnet | Self::Localhost)
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for NetworkType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "mainnet" => Self::Mainnet,
            "testnet" => Self::Testnet,
            "localhost" => Self::Localhost,
            "rpc" => Self::Rpc,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for NetworkType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<NetworkType> for String {
    fn from(value: NetworkType) -> Self {
        match value {
            NetworkType::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for NetworkType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

// ─── ProviderConfig ──────────────────────────────────────────────────────────

fn default_ticker() -> String {
    DEFAULT_TICKER.to_string()
}

/// Which network the provider should talk to, and how.
///
/// `rpc_url` and `chain_id` are only meaningful for [`NetworkType::Rpc`];
/// built-in types resolve to fixed connection facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    #[serde(default, alias = "rpcTarget", skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, alias = "rpcPrefs", skip_serializing_if = "Option::is_none")]
    pub rpc_preferences: Option<Value>,
}

impl ProviderConfig {
    /// A configuration for a built-in network type.
    pub fn builtin(network_type: NetworkType) -> Self {
        Self {
            network_type,
            ..Self::default()
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            rpc_url: None,
            chain_id: None,
            ticker: default_ticker(),
            nickname: None,
            rpc_preferences: None,
        }
    }
}

/// The fields a built-in network switch supplies. Merging it leaves
/// `chain_id` and `rpc_preferences` as they were.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfigPatch {
    pub network_type: NetworkType,
    pub rpc_url: Option<String>,
    pub ticker: String,
    pub nickname: Option<String>,
}

impl ProviderConfigPatch {
    /// A patch selecting `network_type` with the default ticker.
    pub fn new(network_type: NetworkType) -> Self {
        Self {
            network_type,
            rpc_url: None,
            ticker: default_ticker(),
            nickname: None,
        }
    }
}

impl Merge<ProviderConfigPatch> for ProviderConfig {
    fn merge(&mut self, partial: ProviderConfigPatch) -> Result<(), StoreError> {
        self.network_type = partial.network_type;
        self.rpc_url = partial.rpc_url;
        self.ticker = partial.ticker;
        self.nickname = partial.nickname;
        Ok(())
    }
}

impl Merge<ProviderConfig> for ProviderConfig {
    fn merge(&mut self, partial: ProviderConfig) -> Result<(), StoreError> {
        *self = partial;
        Ok(())
    }
}

// ─── NetworkIdentity ─────────────────────────────────────────────────────────

/// The resolved identifier of the network behind the current provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NetworkIdentity {
    /// Unknown: a switch is in progress or the last probe failed.
    Loading,
    /// Network id as text (numeric chain id for built-in networks).
    Resolved(String),
}

impl NetworkIdentity {
    pub fn resolved(id: impl Into<String>) -> Self {
        Self::Resolved(id.into())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Loading => LOADING,
            Self::Resolved(id) => id,
        }
    }
}

impl Default for NetworkIdentity {
    fn default() -> Self {
        Self::Loading
    }
}

impl std::fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for NetworkIdentity {
    fn from(value: String) -> Self {
        if value == LOADING {
            Self::Loading
        } else {
            Self::Resolved(value)
        }
    }
}

impl From<NetworkIdentity> for String {
    fn from(value: NetworkIdentity) -> Self {
        match value {
            NetworkIdentity::Loading => LOADING.to_string(),
            NetworkIdentity::Resolved(id) => id,
        }
    }
}

impl PartialEq<&str> for NetworkIdentity {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

// ─── Registry entries & settings ─────────────────────────────────────────────

/// Resolved connection facts for one network type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub chain_id: Option<String>,
    pub rpc_url: String,
    pub ticker: String,
    pub nickname: String,
}

/// Network-derived settings exposed to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            network: None,
            rpc_url: None,
            ticker: default_ticker(),
            nickname: None,
        }
    }
}

impl From<RegistryEntry> for NetworkSettings {
    fn from(entry: RegistryEntry) -> Self {
        Self {
            network: entry.chain_id,
            rpc_url: Some(entry.rpc_url),
            ticker: entry.ticker,
            nickname: Some(entry.nickname),
        }
    }
}
