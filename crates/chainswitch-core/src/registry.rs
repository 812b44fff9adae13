//! In-memory registry of resolved connection facts, keyed by network type.
//!
//! Every custom endpoint is stored under the single key `"rpc"`, so only the
//! most recently configured custom network is remembered.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::types::{NetworkType, RegistryEntry};

/// Mapping from network type to its [`RegistryEntry`].
///
/// Owned by a controller; share one across controllers by wrapping it in an
/// `Arc` and handing the same instance to each.
#[derive(Debug, Default)]
pub struct NetworkRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry key for a network type.
    pub fn key_for(network_type: &NetworkType) -> &str {
        match network_type {
            NetworkType::Rpc => "rpc",
            other => other.as_str(),
        }
    }

    /// Insert or overwrite the entry for `network_type`.
    pub fn upsert(&self, network_type: &NetworkType, entry: RegistryEntry) {
        let key = Self::key_for(network_type).to_string();
        tracing::debug!(key = %key, rpc_url = %entry.rpc_url, "registry entry updated");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    pub fn get(&self, network_type: &NetworkType) -> Option<RegistryEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(Self::key_for(network_type))
            .cloned()
    }

    /// The chain id recorded for `network_type`, if any.
    pub fn chain_id(&self, network_type: &NetworkType) -> Option<String> {
        self.get(network_type).and_then(|entry| entry.chain_id)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
