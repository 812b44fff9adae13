//! chainswitch-network: network switching for ChainSwitch.
//!
//! [`NetworkController`] keeps one network current, rebuilds the transport
//! on every switch and hands out stable provider / block-tracker handles
//! that survive those rebuilds.
//!
//! # Quick start
//! ```rust,no_run
//! use std::sync::Arc;
//! use chainswitch_core::{NetworkType, RpcTransport};
//! use chainswitch_http::HttpTransportFactory;
//! use chainswitch_network::{BaseParams, NetworkController, NetworkOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = NetworkController::new(
//!     NetworkOptions::from_env(),
//!     Arc::new(HttpTransportFactory::default()),
//! );
//! controller.initialize(BaseParams::default())?;
//! let (provider, _blocks) = controller.get_provider_and_block_tracker();
//!
//! controller.set_provider_type(NetworkType::Testnet)?;
//! let epoch: String = provider.call(1, "cfx_epochNumber", vec![]).await?;
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod config;
pub mod controller;
pub mod error;
pub mod presets;

pub use base::{BaseMiddleware, BaseParams};
pub use config::{default_network_type, NetworkOptions};
pub use controller::{ControllerStatus, NetworkController, RpcTarget};
pub use error::NetworkError;
pub use presets::NetworkPreset;
