//! Polling block tracker: asks the node for its head epoch on a fixed
//! interval and emits [`BlockEvent`]s when it moves.
//!
//! Polling runs in a Tokio task that starts with the first listener and
//! stops when the last listener is removed or the tracker is dropped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use chainswitch_core::block::{BlockEvent, BlockListener, BlockSource};
use chainswitch_core::error::TransportError;
use chainswitch_core::listeners::{ListenerId, Listeners};
use chainswitch_core::request::JsonRpcRequest;
use chainswitch_core::transport::RpcTransport;

/// Method used to read the head epoch.
pub const EPOCH_METHOD: &str = "cfx_epochNumber";

/// Parse a JSON-RPC quantity: `"0x1a"` hex strings, decimal strings or numbers.
pub fn parse_quantity(value: &Value) -> Result<u64, TransportError> {
    let invalid = || TransportError::Other(format!("invalid quantity: {value}"));
    match value {
        Value::String(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| invalid()),
            None => s.parse::<u64>().map_err(|_| invalid()),
        },
        Value::Number(n) => n.as_u64().ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[derive(Default)]
struct TrackerShared {
    listeners: Listeners<BlockEvent>,
    latest: Mutex<Option<u64>>,
}

impl TrackerShared {
    /// Record `epoch`; emits `Sync` then `Latest` if the head moved.
    fn observe(&self, epoch: u64) {
        let previous = {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            if *latest == Some(epoch) {
                return;
            }
            latest.replace(epoch)
        };
        self.listeners.emit(&BlockEvent::Sync {
            old: previous,
            new: epoch,
        });
        self.listeners.emit(&BlockEvent::Latest { epoch });
    }

    fn latest(&self) -> Option<u64> {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A [`BlockSource`] that polls [`EPOCH_METHOD`] through a transport.
pub struct PollingBlockTracker {
    transport: Arc<dyn RpcTransport>,
    interval: Duration,
    shared: Arc<TrackerShared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollingBlockTracker {
    pub fn new(transport: Arc<dyn RpcTransport>, interval: Duration) -> Self {
        Self {
            transport,
            interval,
            shared: Arc::new(TrackerShared::default()),
            task: Mutex::new(None),
        }
    }

    /// Returns `true` while the polling task is running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                url = %self.transport.url(),
                "no Tokio runtime available, block polling disabled"
            );
            return;
        };
        tracing::debug!(
            url = %self.transport.url(),
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "block tracker started"
        );
        *task = Some(runtime.spawn(poll_loop(
            Arc::clone(&self.transport),
            Arc::clone(&self.shared),
            self.interval,
        )));
    }

    fn stop(&self) {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!(url = %self.transport.url(), "block tracker stopped");
            self.shared.listeners.emit(&BlockEvent::Stopped);
        }
    }
}

impl BlockSource for PollingBlockTracker {
    fn on(&self, listener: BlockListener) -> ListenerId {
        let id = self.shared.listeners.add(listener);
        self.start();
        id
    }

    fn off(&self, id: ListenerId) -> bool {
        let removed = self.shared.listeners.remove(id);
        if removed && self.shared.listeners.is_empty() {
            self.stop();
        }
        removed
    }

    fn latest(&self) -> Result<Option<u64>, TransportError> {
        Ok(self.shared.latest())
    }

    fn listener_count(&self) -> usize {
        self.shared.listeners.len()
    }
}

impl Drop for PollingBlockTracker {
    fn drop(&mut self) {
        if let Some(handle) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

async fn poll_loop(transport: Arc<dyn RpcTransport>, shared: Arc<TrackerShared>, interval: Duration) {
    shared.listeners.emit(&BlockEvent::Started);
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut request_id = 0u64;

    loop {
        ticker.tick().await;
        request_id += 1;
        match fetch_epoch(transport.as_ref(), request_id).await {
            Ok(epoch) => shared.observe(epoch),
            Err(e) => {
                tracing::warn!(url = %transport.url(), error = %e, "block poll failed");
                shared.listeners.emit(&BlockEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }
}

async fn fetch_epoch(transport: &dyn RpcTransport, id: u64) -> Result<u64, TransportError> {
    let resp = transport
        .send(JsonRpcRequest::new(id, EPOCH_METHOD, vec![]))
        .await?;
    let value = resp.into_result().map_err(TransportError::Rpc)?;
    parse_quantity(&value)
}
