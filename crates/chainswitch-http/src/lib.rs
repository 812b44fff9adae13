//! chainswitch-http: HTTP transport for ChainSwitch.
//!
//! # Features
//! - JSON-RPC over HTTP(S) via `reqwest`, one request per call
//! - Polling block tracker that runs only while someone is listening
//! - [`HttpTransportFactory`] for preset, localhost and custom endpoints

pub mod client;
pub mod factory;
pub mod tracker;

pub use client::{parse_rpc_url, HttpClientConfig, HttpRpcClient};
pub use factory::{HttpTransportFactory, LOCALHOST_RPC_URL};
pub use tracker::{parse_quantity, PollingBlockTracker, EPOCH_METHOD};
