//! chainswitch CLI: inspect networks and follow block changes from the terminal.
//!
//! Usage:
//! ```bash
//! # List built-in networks
//! chainswitch networks
//!
//! # Resolve the identity of a network and print the controller state
//! chainswitch probe --network testnet
//! chainswitch probe --url http://localhost:8545 --chain-id 7
//!
//! # Print the next five block events
//! chainswitch blocks --network mainnet --count 5
//! ```

mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;

use chainswitch_core::{BlockEvent, BlockSource, NetworkType, ProviderConfig};
use chainswitch_http::{HttpClientConfig, HttpTransportFactory};
use chainswitch_network::{presets, BaseParams, NetworkController, NetworkOptions};

use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "chainswitch",
    about = "Probe blockchain networks through a switching network controller",
    long_about = "
ChainSwitch CLI: resolve network identities and follow chain heads through
the same stable provider and block-tracker handles an application uses.

ENVIRONMENT VARIABLES:
  RUST_LOG            Log filter (overrides --log-level)
  IN_TEST             'true' selects localhost as the default network
  CHAINSWITCH_DEBUG   When set, testnet is the default network
  CHAINSWITCH_ENV     'test' selects localhost as the default network
",
    version
)]
struct Cli {
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in networks
    Networks,

    /// Resolve the network identity and print the controller state as JSON
    Probe {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print block events received through the stable block-tracker handle
    Blocks {
        #[command(flatten)]
        target: TargetArgs,
        /// Number of events to print
        #[arg(long, default_value_t = 3)]
        count: usize,
        /// Seconds between head polls
        #[arg(long, default_value_t = 4)]
        poll_interval: u64,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Built-in network: mainnet | testnet | localhost (default chosen from the environment)
    #[arg(long, conflicts_with = "url")]
    network: Option<String>,
    /// Custom JSON-RPC endpoint
    #[arg(long, requires = "chain_id")]
    url: Option<String>,
    /// Chain id of the custom endpoint
    #[arg(long)]
    chain_id: Option<String>,
    /// Ticker of the custom endpoint
    #[arg(long, default_value = "CFX")]
    ticker: String,
    /// Seconds to wait for the node
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

impl TargetArgs {
    fn options(&self) -> Result<NetworkOptions> {
        let provider = match (&self.network, &self.url) {
            (Some(name), _) => {
                let network_type = NetworkType::from(name.as_str());
                if !network_type.is_builtin() {
                    bail!("unknown network '{name}' (expected mainnet, testnet or localhost)");
                }
                ProviderConfig::builtin(network_type)
            }
            (None, Some(url)) => ProviderConfig {
                network_type: NetworkType::Rpc,
                rpc_url: Some(url.clone()),
                chain_id: self.chain_id.clone(),
                ticker: self.ticker.clone(),
                nickname: Some("custom".into()),
                rpc_preferences: None,
            },
            (None, None) => return Ok(NetworkOptions::from_env()),
        };
        Ok(NetworkOptions {
            provider: Some(provider),
            ..NetworkOptions::default()
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&LogConfig {
        level: cli.log_level.clone(),
        json: cli.json_logs,
    });

    match cli.command {
        Commands::Networks => {
            cmd_networks();
            Ok(())
        }
        Commands::Probe { target } => cmd_probe(&target).await,
        Commands::Blocks {
            target,
            count,
            poll_interval,
        } => cmd_blocks(&target, count, Duration::from_secs(poll_interval)).await,
    }
}

fn cmd_networks() {
    println!("Built-in networks:\n");
    for preset in presets::ALL {
        println!("  {:<10} {}", preset.name, preset.rpc_url);
        match preset.chain_id {
            Some(id) => println!("             Chain id: {id}"),
            None => println!("             Chain id: reported by the node"),
        }
        println!("             Ticker:   {}", preset.ticker);
        println!();
    }
    println!("  rpc        any JSON-RPC endpoint (--url <URL> --chain-id <ID>)");
}

fn start(target: &TargetArgs, poll_interval: Duration) -> Result<NetworkController> {
    let factory = HttpTransportFactory::new(HttpClientConfig {
        request_timeout: target.timeout(),
        poll_interval,
    });
    let controller = NetworkController::new(target.options()?, Arc::new(factory));
    controller
        .initialize(BaseParams::default())
        .context("configuring the network transport")?;
    Ok(controller)
}

async fn cmd_probe(target: &TargetArgs) -> Result<()> {
    let controller = start(target, HttpClientConfig::default().poll_interval)?;

    if tokio::time::timeout(target.timeout(), controller.settle())
        .await
        .is_err()
    {
        tracing::warn!("identity probe did not answer in time");
    }

    let state = controller.store().get();
    println!("{}", serde_json::to_string_pretty(&state)?);

    if controller.is_network_loading() {
        bail!(
            "network identity not resolved (status: {})",
            controller.status()
        );
    }
    Ok(())
}

async fn cmd_blocks(target: &TargetArgs, count: usize, poll_interval: Duration) -> Result<()> {
    let controller = start(target, poll_interval)?;
    let (_, blocks) = controller.get_provider_and_block_tracker();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let listener = blocks.on(Arc::new(move |event: &BlockEvent| {
        let _ = tx.send(event.clone());
    }));

    for _ in 0..count {
        let event = rx
            .recv()
            .await
            .context("block tracker stopped unexpectedly")?;
        println!("{}", serde_json::to_string(&event)?);
    }

    blocks.off(listener);
    println!("network: {}", controller.get_network_state());
    Ok(())
}
