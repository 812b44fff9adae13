//! Built-in networks and their fixed connection facts.

use chainswitch_core::types::{NetworkType, RegistryEntry, DEFAULT_TICKER};
use chainswitch_http::LOCALHOST_RPC_URL;

use crate::error::NetworkError;

/// Connection facts for a network type that needs no user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkPreset {
    pub name: &'static str,
    pub rpc_url: &'static str,
    pub chain_id: Option<&'static str>,
    pub ticker: &'static str,
    pub nickname: &'static str,
}

pub const MAINNET: NetworkPreset = NetworkPreset {
    name: "mainnet",
    rpc_url: "http://wallet-mainnet-jsonrpc.conflux-chain.org:12537",
    chain_id: Some("0"),
    ticker: DEFAULT_TICKER,
    nickname: "mainnet",
};

pub const TESTNET: NetworkPreset = NetworkPreset {
    name: "testnet",
    rpc_url: "http://wallet-testnet-jsonrpc.conflux-chain.org:12537",
    chain_id: Some("1"),
    ticker: DEFAULT_TICKER,
    nickname: "testnet",
};

pub const LOCALHOST: NetworkPreset = NetworkPreset {
    name: "localhost",
    rpc_url: LOCALHOST_RPC_URL,
    chain_id: None,
    ticker: DEFAULT_TICKER,
    nickname: "localhost",
};

/// All built-in presets, in display order.
pub const ALL: [NetworkPreset; 3] = [MAINNET, TESTNET, LOCALHOST];

impl NetworkPreset {
    pub fn network_type(&self) -> NetworkType {
        NetworkType::from(self.name)
    }

    /// Registry entry for this preset.
    pub fn entry(&self) -> RegistryEntry {
        RegistryEntry {
            chain_id: self.chain_id.map(str::to_string),
            rpc_url: self.rpc_url.to_string(),
            ticker: self.ticker.to_string(),
            nickname: self.nickname.to_string(),
        }
    }
}

/// The preset for a built-in type. Any other type is an internal error:
/// callers dispatch on the type before asking.
pub fn preset_for(network_type: &NetworkType) -> Result<&'static NetworkPreset, NetworkError> {
    match network_type {
        NetworkType::Mainnet => Ok(&MAINNET),
        NetworkType::Testnet => Ok(&TESTNET),
        NetworkType::Localhost => Ok(&LOCALHOST),
        other => Err(NetworkError::Internal(format!(
            "no built-in preset for network type \"{other}\""
        ))),
    }
}
