//! The network controller.
//!
//! Keeps exactly one network current and hands out two stable handles, one
//! over the provider and one over the block tracker, that stay valid across
//! every switch.
//!
//! ```text
//! set_provider_type ─┐
//! set_rpc_target    ─┼─► provider store ─► switch_transport ─► schedule_identity_lookup
//! reset_connection  ─┘                       │                    │
//!                                            ├─ identity = loading └─ probe ─► commit if not stale
//!                                            ├─ factory → [base, network] pipeline
//!                                            ├─ rebind ProviderHandle / BlockTrackerHandle
//!                                            └─ broadcast networkChanged(type)
//! ```
//!
//! # Stale probes
//!
//! An identity probe snapshots `(switch generation, identity)` before it is
//! sent. Every switch bumps the generation, so a probe whose snapshot no
//! longer matches on completion belongs to a superseded switch and its
//! result is dropped. The in-flight call itself is never cancelled.
//!
//! A probe derives its identity from the network the handles are bound to,
//! not from the stored configuration. The two differ after a switch whose
//! transport could not be built.
//!
//! # Listeners
//!
//! Store listeners run synchronously inside the controller operation that
//! changed the store. They may read controller state but must not call its
//! mutators.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use chainswitch_core::block::{BlockEvent, BlockSource, EventFilter};
use chainswitch_core::error::TransportError;
use chainswitch_core::factory::{NetworkClient, TransportFactory};
use chainswitch_core::handle::{BlockTrackerHandle, ProviderHandle};
use chainswitch_core::listeners::ListenerId;
use chainswitch_core::middleware::{EngineProvider, RpcEngine};
use chainswitch_core::registry::NetworkRegistry;
use chainswitch_core::request::JsonRpcRequest;
use chainswitch_core::store::{ComposedStore, ObservableStore};
use chainswitch_core::transport::RpcTransport;
use chainswitch_core::types::{
    NetworkIdentity, NetworkSettings, NetworkType, ProviderConfig, ProviderConfigPatch,
    RegistryEntry, DEFAULT_TICKER,
};
use chainswitch_http::EPOCH_METHOD;

use crate::base::{BaseMiddleware, BaseParams};
use crate::config::NetworkOptions;
use crate::error::NetworkError;
use crate::presets;

const NETWORK_CHANGED_CAPACITY: usize = 16;

/// Where the controller is in its switching cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    /// No transport has been configured yet.
    Uninitialized,
    /// A switch happened and its identity probe has not answered.
    Switching,
    /// The network identity is resolved.
    Ready,
    /// The last identity probe failed; the transport is still bound.
    Degraded,
}

impl std::fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Switching => "switching",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
        };
        f.write_str(s)
    }
}

/// A custom JSON-RPC endpoint for [`NetworkController::set_rpc_target`].
#[derive(Debug, Clone, PartialEq)]
pub struct RpcTarget {
    pub rpc_url: String,
    pub chain_id: String,
    pub ticker: String,
    pub nickname: String,
    pub rpc_preferences: Option<Value>,
}

impl RpcTarget {
    /// Target with ticker `CFX` and an empty nickname.
    pub fn new(rpc_url: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id: chain_id.into(),
            ticker: DEFAULT_TICKER.to_string(),
            nickname: String::new(),
            rpc_preferences: None,
        }
    }

    pub fn ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = ticker.into();
        self
    }

    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    pub fn rpc_preferences(mut self, preferences: Value) -> Self {
        self.rpc_preferences = Some(preferences);
        self
    }

    fn into_config(self) -> ProviderConfig {
        ProviderConfig {
            network_type: NetworkType::Rpc,
            rpc_url: Some(self.rpc_url),
            chain_id: Some(self.chain_id),
            ticker: self.ticker,
            nickname: Some(self.nickname),
            rpc_preferences: self.rpc_preferences,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProbeSnapshot {
    generation: u64,
    identity: NetworkIdentity,
}

/// Network behind the currently bound transport.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BoundNetwork {
    network_type: NetworkType,
    chain_id: Option<String>,
}

struct Inner {
    factory: Arc<dyn TransportFactory>,
    registry: Arc<NetworkRegistry>,

    provider_store: Arc<ObservableStore<ProviderConfig>>,
    network_store: Arc<ObservableStore<NetworkIdentity>>,
    settings_store: Arc<ObservableStore<NetworkSettings>>,
    store: ComposedStore,

    provider: ProviderHandle,
    block_tracker: BlockTrackerHandle,
    base: Mutex<Arc<BaseMiddleware>>,
    bound: Mutex<Option<BoundNetwork>>,

    /// Switch generation. Held for the whole of a switch and for probe commits.
    generation: Mutex<u64>,
    probe_failed: AtomicBool,
    probe_ids: AtomicU64,

    network_changed: broadcast::Sender<NetworkType>,
    block_listener: Mutex<Option<ListenerId>>,
    lookups: Mutex<Vec<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the network stores and stable handles and performs every switch.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct NetworkController {
    inner: Arc<Inner>,
}

impl NetworkController {
    /// Create a controller with its own, empty registry.
    pub fn new(options: NetworkOptions, factory: Arc<dyn TransportFactory>) -> Self {
        Self::with_registry(options, factory, Arc::new(NetworkRegistry::new()))
    }

    /// Create a controller recording connection facts in `registry`, which
    /// may be shared with other controllers.
    pub fn with_registry(
        options: NetworkOptions,
        factory: Arc<dyn TransportFactory>,
        registry: Arc<NetworkRegistry>,
    ) -> Self {
        let provider_store = Arc::new(ObservableStore::new(options.provider_config()));
        let network_store = Arc::new(ObservableStore::new(NetworkIdentity::Loading));
        let settings_store = Arc::new(ObservableStore::new(NetworkSettings::default()));
        let store = ComposedStore::builder()
            .child("provider", Arc::clone(&provider_store))
            .child("network", Arc::clone(&network_store))
            .child("settings", Arc::clone(&settings_store))
            .build();
        let (network_changed, _) = broadcast::channel(NETWORK_CHANGED_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                factory,
                registry,
                provider_store,
                network_store,
                settings_store,
                store,
                provider: ProviderHandle::empty("provider"),
                block_tracker: BlockTrackerHandle::empty(EventFilter::SkipInternal),
                base: Mutex::new(Arc::new(BaseMiddleware::new(options.base))),
                bound: Mutex::new(None),
                generation: Mutex::new(0),
                probe_failed: AtomicBool::new(false),
                probe_ids: AtomicU64::new(1),
                network_changed,
                block_listener: Mutex::new(None),
                lookups: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Configure a transport for the stored provider configuration and look
    /// up the network identity. Call exactly once.
    pub fn initialize(&self, base: BaseParams) -> Result<(), NetworkError> {
        *lock(&self.inner.base) = Arc::new(BaseMiddleware::new(base));
        self.attach_block_listener();

        let config = self.inner.provider_store.get();
        {
            let _generation = lock(&self.inner.generation);
            self.inner.configure(&config)?;
        }
        self.lookup_network();
        Ok(())
    }

    /// The two stable handles. Every call returns handles over the same
    /// slots, before and after any number of switches.
    pub fn get_provider_and_block_tracker(&self) -> (ProviderHandle, BlockTrackerHandle) {
        (self.inner.provider.clone(), self.inner.block_tracker.clone())
    }

    pub fn get_network_state(&self) -> NetworkIdentity {
        self.inner.network_store.get()
    }

    pub fn get_network_config(&self) -> NetworkSettings {
        self.inner.settings_store.get()
    }

    pub fn get_provider_config(&self) -> ProviderConfig {
        self.inner.provider_store.get()
    }

    pub fn is_network_loading(&self) -> bool {
        self.get_network_state().is_loading()
    }

    /// Returns `true` once a transport has been bound.
    pub fn is_initialized(&self) -> bool {
        self.inner.provider.is_bound()
    }

    pub fn status(&self) -> ControllerStatus {
        if !self.is_initialized() {
            return ControllerStatus::Uninitialized;
        }
        match self.get_network_state() {
            NetworkIdentity::Resolved(_) => ControllerStatus::Ready,
            NetworkIdentity::Loading if self.inner.probe_failed.load(Ordering::SeqCst) => {
                ControllerStatus::Degraded
            }
            NetworkIdentity::Loading => ControllerStatus::Switching,
        }
    }

    /// Composed view `{ provider, network, settings }` of the three stores.
    pub fn store(&self) -> ComposedStore {
        self.inner.store.clone()
    }

    /// Follow the network identity asynchronously.
    pub fn watch_network(&self) -> watch::Receiver<NetworkIdentity> {
        self.inner.network_store.watch()
    }

    /// Receive the network type of every completed switch.
    pub fn subscribe_network_changed(&self) -> broadcast::Receiver<NetworkType> {
        self.inner.network_changed.subscribe()
    }

    pub fn registry(&self) -> &Arc<NetworkRegistry> {
        &self.inner.registry
    }

    /// Switch to a built-in network.
    pub fn set_provider_type(&self, network_type: NetworkType) -> Result<(), NetworkError> {
        self.set_provider_type_with(ProviderConfigPatch::new(network_type))
    }

    /// Switch to a built-in network, also recording the supplied url,
    /// ticker and nickname. `chain_id` and `rpc_preferences` of the stored
    /// configuration are kept.
    ///
    /// Fails with [`NetworkError::Precondition`] for [`NetworkType::Rpc`]
    /// (use [`set_rpc_target`](Self::set_rpc_target)) and for unknown types,
    /// before any state changes.
    pub fn set_provider_type_with(&self, patch: ProviderConfigPatch) -> Result<(), NetworkError> {
        match &patch.network_type {
            NetworkType::Rpc => {
                return Err(NetworkError::Precondition(
                    "cannot call set_provider_type with type 'rpc'; use set_rpc_target".into(),
                ))
            }
            t if !t.is_builtin() => {
                return Err(NetworkError::Precondition(format!("unknown rpc type \"{t}\"")))
            }
            _ => {}
        }
        self.inner.provider_store.update(patch)?;
        self.switch_network(self.inner.provider_store.get())
    }

    /// Switch to a custom JSON-RPC endpoint.
    pub fn set_rpc_target(&self, target: RpcTarget) -> Result<(), NetworkError> {
        if target.rpc_url.trim().is_empty() {
            return Err(NetworkError::Precondition("rpc target requires an rpc url".into()));
        }
        if target.chain_id.trim().is_empty() {
            return Err(NetworkError::Precondition("rpc target requires a chain id".into()));
        }
        let config = target.into_config();
        self.inner.provider_store.update(config.clone())?;
        self.switch_network(config)
    }

    /// Build a fresh transport for the current configuration.
    pub fn reset_connection(&self) -> Result<(), NetworkError> {
        let config = self.get_provider_config();
        self.inner.provider_store.update(config.clone())?;
        self.switch_network(config)
    }

    /// Probe the current provider for its network identity.
    ///
    /// Returns `false` without probing when no provider is configured or no
    /// Tokio runtime is available. The result is committed from a spawned
    /// task, and only if no switch happened in between.
    pub fn lookup_network(&self) -> bool {
        let inner = &self.inner;
        let (snapshot, provider, bound) = {
            let generation = lock(&inner.generation);
            let bound = lock(&inner.bound).clone();
            let (Some(provider), Some(bound)) = (inner.provider.target(), bound) else {
                tracing::warn!("lookup_network aborted due to missing provider");
                return false;
            };
            let snapshot = ProbeSnapshot {
                generation: *generation,
                identity: inner.network_store.get(),
            };
            (snapshot, provider, bound)
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("lookup_network aborted: no Tokio runtime");
            return false;
        };
        let id = inner.probe_ids.fetch_add(1, Ordering::Relaxed);
        let weak: Weak<Inner> = Arc::downgrade(inner);
        let task = runtime.spawn(async move {
            let outcome = probe(provider.as_ref(), id).await;
            if let Some(inner) = weak.upgrade() {
                inner.commit_probe(&snapshot, &bound, outcome);
            }
        });

        let mut lookups = lock(&inner.lookups);
        lookups.retain(|task| !task.is_finished());
        lookups.push(task);
        true
    }

    /// Re-run [`lookup_network`](Self::lookup_network) if the identity is
    /// still `loading`.
    pub fn verify_network(&self) {
        if self.is_network_loading() {
            self.lookup_network();
        }
    }

    /// Wait until every identity probe started so far has completed.
    /// A probe that never answers keeps this pending.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *lock(&self.inner.lookups));
            if pending.is_empty() {
                return;
            }
            for task in pending {
                if let Err(e) = task.await {
                    if e.is_panic() {
                        tracing::error!(error = %e, "identity probe task panicked");
                    }
                }
            }
        }
    }

    fn switch_network(&self, config: ProviderConfig) -> Result<(), NetworkError> {
        self.switch_transport(&config)?;
        self.schedule_identity_lookup();
        Ok(())
    }

    fn switch_transport(&self, config: &ProviderConfig) -> Result<(), NetworkError> {
        {
            let mut generation = lock(&self.inner.generation);
            *generation += 1;
            self.inner.probe_failed.store(false, Ordering::SeqCst);
            self.inner.network_store.put(NetworkIdentity::Loading);
            self.inner.configure(config)?;
        }
        // No receivers is fine.
        let _ = self.inner.network_changed.send(config.network_type.clone());
        Ok(())
    }

    fn schedule_identity_lookup(&self) {
        if !self.lookup_network() {
            tracing::debug!("identity lookup not scheduled");
        }
    }

    fn attach_block_listener(&self) {
        let mut slot = lock(&self.inner.block_listener);
        if slot.is_some() {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let id = self.inner.block_tracker.on(Arc::new(move |event: &BlockEvent| {
            let BlockEvent::Latest { epoch } = event else {
                return;
            };
            if let Some(inner) = weak.upgrade() {
                tracing::debug!(epoch, "block changed");
                NetworkController { inner }.verify_network();
            }
        }));
        *slot = Some(id);
    }
}

impl std::fmt::Debug for NetworkController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkController")
            .field("type", &self.get_provider_config().network_type)
            .field("network", &self.get_network_state())
            .field("status", &self.status())
            .finish()
    }
}

impl Inner {
    /// Build a transport for `config` and rebind both handles to it.
    /// Nothing is rebound if construction fails.
    fn configure(&self, config: &ProviderConfig) -> Result<(), NetworkError> {
        let network_type = &config.network_type;
        let (client, entry) = match network_type {
            NetworkType::Mainnet | NetworkType::Testnet => {
                let entry = presets::preset_for(network_type)?.entry();
                tracing::info!(network = %network_type, rpc_url = %entry.rpc_url, "configuring standard provider");
                let client = self.factory.create_json_rpc_client(&entry.rpc_url)?;
                self.registry.upsert(network_type, entry.clone());
                (client, entry)
            }
            NetworkType::Localhost => {
                tracing::info!("configuring localhost provider");
                let client = self.factory.create_localhost_client()?;
                let entry = RegistryEntry {
                    rpc_url: client.rpc_url.clone(),
                    ..presets::LOCALHOST.entry()
                };
                self.registry.upsert(network_type, entry.clone());
                (client, entry)
            }
            NetworkType::Rpc => {
                let entry = custom_entry(config)?;
                self.registry.upsert(network_type, entry.clone());
                tracing::info!(rpc_url = %entry.rpc_url, chain_id = ?entry.chain_id, "configuring custom provider");
                (self.factory.create_json_rpc_client(&entry.rpc_url)?, entry)
            }
            NetworkType::Unknown(other) => {
                return Err(NetworkError::UnknownNetworkType(other.clone()));
            }
        };

        let bound = BoundNetwork {
            network_type: network_type.clone(),
            chain_id: entry.chain_id.clone(),
        };
        self.settings_store.put(NetworkSettings::from(entry));
        self.bind(client, bound);
        Ok(())
    }

    /// Wrap the network layer behind the base layer and rebind the handles.
    fn bind(&self, client: NetworkClient, bound: BoundNetwork) {
        let base = Arc::clone(&*lock(&self.base));
        let engine = RpcEngine::new().push(base).push(client.middleware);
        let provider = EngineProvider::new(engine, client.rpc_url, client.transport);
        self.provider.set_target(Arc::new(provider));
        self.block_tracker.set_target(client.block_tracker);
        *lock(&self.bound) = Some(bound);
    }

    fn commit_probe(
        &self,
        snapshot: &ProbeSnapshot,
        bound: &BoundNetwork,
        outcome: Result<Value, TransportError>,
    ) {
        let network_type = &bound.network_type;
        let generation = lock(&self.generation);
        if *generation != snapshot.generation || self.network_store.get() != snapshot.identity {
            tracing::debug!(network = %network_type, "discarding identity probe of a superseded switch");
            return;
        }
        match outcome {
            Err(e) => {
                tracing::warn!(network = %network_type, error = %e, "identity probe failed");
                self.probe_failed.store(true, Ordering::SeqCst);
                self.network_store.put(NetworkIdentity::Loading);
            }
            Ok(raw) => {
                let identity = derive_identity(bound, &raw);
                tracing::info!(network = %network_type, identity = %identity, "network identity resolved");
                self.probe_failed.store(false, Ordering::SeqCst);
                self.network_store.put(NetworkIdentity::Resolved(identity));
            }
        }
    }
}

fn custom_entry(config: &ProviderConfig) -> Result<RegistryEntry, NetworkError> {
    let rpc_url = config
        .rpc_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| NetworkError::Precondition("rpc configuration requires an rpc url".into()))?;
    let ticker = if config.ticker.is_empty() {
        DEFAULT_TICKER.to_string()
    } else {
        config.ticker.clone()
    };
    Ok(RegistryEntry {
        chain_id: config.chain_id.clone(),
        rpc_url: rpc_url.to_string(),
        ticker,
        nickname: config.nickname.clone().unwrap_or_default(),
    })
}

async fn probe(provider: &dyn RpcTransport, id: u64) -> Result<Value, TransportError> {
    let resp = provider
        .send(JsonRpcRequest::new(id, EPOCH_METHOD, vec![]))
        .await?;
    resp.into_result().map_err(TransportError::Rpc)
}

/// Identity for a successful probe: fixed ids for mainnet and testnet, the
/// chain id registered when the transport was bound if there is one, the raw
/// probe value otherwise.
fn derive_identity(bound: &BoundNetwork, raw: &Value) -> String {
    match bound.network_type {
        NetworkType::Mainnet => "0".to_string(),
        NetworkType::Testnet => "1".to_string(),
        _ => bound.chain_id.clone().unwrap_or_else(|| match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
    }
}
