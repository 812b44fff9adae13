//! chainswitch-core: foundation traits and types for ChainSwitch.
//!
//! # Overview
//!
//! ChainSwitch keeps a client application connected to exactly one
//! blockchain network at a time while letting it switch networks without
//! invalidating the provider references held elsewhere. The core crate
//! defines:
//!
//! - [`RpcTransport`]: the async call surface every provider implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types
//! - [`RpcEngine`] / [`EngineProvider`]: middleware pipeline and the provider derived from it
//! - [`BlockSource`]: chain-head event sources
//! - [`TransportFactory`]: builds the network-specific middleware and block source
//! - [`ProviderHandle`] / [`BlockTrackerHandle`]: stable handles over swappable targets
//! - [`ObservableStore`] / [`ComposedStore`]: observable state
//! - [`NetworkRegistry`]: resolved connection facts per network type
//! - [`TransportError`] / [`StoreError`]: structured error types

pub mod block;
pub mod error;
pub mod factory;
pub mod handle;
pub mod listeners;
pub mod middleware;
pub mod registry;
pub mod request;
pub mod store;
pub mod transport;
pub mod types;

pub use block::{BlockEvent, BlockListener, BlockSource, EventFilter};
pub use error::{StoreError, TransportError};
pub use factory::{NetworkClient, TransportFactory};
pub use handle::{BlockTrackerHandle, ProviderHandle, SwappableHandle};
pub use listeners::{Listener, ListenerId, Listeners};
pub use middleware::{EngineProvider, Next, RpcEngine, RpcMiddleware, TransportMiddleware};
pub use registry::NetworkRegistry;
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use store::{ComposedStore, Merge, ObservableStore};
pub use transport::{HealthStatus, RpcTransport};
pub use types::{
    NetworkIdentity, NetworkSettings, NetworkType, ProviderConfig, ProviderConfigPatch,
    RegistryEntry, DEFAULT_TICKER, LOADING,
};
