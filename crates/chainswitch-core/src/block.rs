//! Block-change sources: emit events when a new chain head is observed.

use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::listeners::{Listener, ListenerId};

/// An event emitted by a [`BlockSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BlockEvent {
    /// A new head epoch was observed.
    Latest { epoch: u64 },
    /// The head moved from `old` to `new`.
    Sync { old: Option<u64>, new: u64 },
    /// Polling the head failed.
    Error { message: String },
    /// The source began tracking (internal bookkeeping).
    Started,
    /// The source stopped tracking (internal bookkeeping).
    Stopped,
}

impl BlockEvent {
    /// Returns `true` for events the source generates for its own bookkeeping.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Started | Self::Stopped)
    }
}

/// Which events a block-tracker handle forwards to external listeners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventFilter {
    /// Forward everything.
    #[default]
    All,
    /// Drop events for which [`BlockEvent::is_internal`] is `true`.
    SkipInternal,
}

impl EventFilter {
    pub fn allows(self, event: &BlockEvent) -> bool {
        match self {
            Self::All => true,
            Self::SkipInternal => !event.is_internal(),
        }
    }
}

/// Listener type for block events.
pub type BlockListener = Listener<BlockEvent>;

/// A source of chain-head events.
///
/// Implementations decide when to start and stop tracking; the usual
/// convention is to track while at least one listener is registered.
pub trait BlockSource: Send + Sync + 'static {
    /// Register a listener.
    fn on(&self, listener: BlockListener) -> ListenerId;

    /// Remove a listener. Returns `false` if it was not registered.
    fn off(&self, id: ListenerId) -> bool;

    /// The most recently observed head epoch, if any.
    fn latest(&self) -> Result<Option<u64>, TransportError>;

    /// Number of registered listeners.
    fn listener_count(&self) -> usize;
}
