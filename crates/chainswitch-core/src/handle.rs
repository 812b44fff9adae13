//! Stable handles over swappable targets.
//!
//! A handle is handed out once and stays valid while its target is replaced
//! any number of times. Clones share the same slot, so a rebind through one
//! clone is observed by all of them.
//!
//! ```text
//! consumer ──► ProviderHandle ──► [slot] ──► EngineProvider (network A)
//!                                   │
//!                      set_target   └──────► EngineProvider (network B)
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;

use crate::block::{BlockEvent, BlockListener, BlockSource, EventFilter};
use crate::error::TransportError;
use crate::listeners::ListenerId;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::{HealthStatus, RpcTransport};

/// A fixed-identity indirection over a replaceable `Arc<T>`.
pub struct SwappableHandle<T: ?Sized + Send + Sync + 'static> {
    slot: Arc<ArcSwapOption<Arc<T>>>,
    label: &'static str,
}

impl<T: ?Sized + Send + Sync + 'static> Clone for SwappableHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            label: self.label,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> SwappableHandle<T> {
    /// Create a handle with no target. `label` names it in errors.
    pub fn empty(label: &'static str) -> Self {
        Self {
            slot: Arc::new(ArcSwapOption::empty()),
            label,
        }
    }

    /// Create a handle bound to `target`.
    pub fn new(label: &'static str, target: Arc<T>) -> Self {
        let handle = Self::empty(label);
        handle.set_target(target);
        handle
    }

    /// Atomically rebind the handle. Outstanding clones observe the new target.
    pub fn set_target(&self, target: Arc<T>) {
        self.slot.store(Some(Arc::new(target)));
    }

    /// The current target, if one is bound.
    pub fn target(&self) -> Option<Arc<T>> {
        self.slot.load_full().map(|bound| Arc::clone(bound.as_ref()))
    }

    /// The current target, or [`TransportError::Uninitialized`].
    pub fn try_target(&self) -> Result<Arc<T>, TransportError> {
        self.target()
            .ok_or(TransportError::Uninitialized { what: self.label })
    }

    pub fn is_bound(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Returns `true` if both handles share the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T: ?Sized + Send + Sync + 'static> std::fmt::Debug for SwappableHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwappableHandle")
            .field("label", &self.label)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Stable handle over the current RPC provider.
pub type ProviderHandle = SwappableHandle<dyn RpcTransport>;

#[async_trait]
impl RpcTransport for SwappableHandle<dyn RpcTransport> {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let target = self.try_target()?;
        target.send(req).await
    }

    fn health(&self) -> HealthStatus {
        self.target()
            .map_or(HealthStatus::Unknown, |target| target.health())
    }

    fn url(&self) -> String {
        self.target().map_or_else(String::new, |target| target.url())
    }
}

struct Attachment {
    listener: BlockListener,
    target_id: Option<ListenerId>,
}

#[derive(Default)]
struct TrackerSlot {
    target: Option<Arc<dyn BlockSource>>,
    attachments: BTreeMap<ListenerId, Attachment>,
}

struct TrackerHandleInner {
    filter: EventFilter,
    next_id: AtomicU64,
    slot: Mutex<TrackerSlot>,
}

/// Stable handle over the current block-change source.
///
/// Listeners belong to the handle, not the target: they are attached to
/// whatever target is bound when they are registered, and migrated to the
/// new target on every [`set_target`](Self::set_target). The configured
/// [`EventFilter`] applies to every forwarded event.
#[derive(Clone)]
pub struct BlockTrackerHandle {
    inner: Arc<TrackerHandleInner>,
}

impl BlockTrackerHandle {
    pub fn empty(filter: EventFilter) -> Self {
        Self {
            inner: Arc::new(TrackerHandleInner {
                filter,
                next_id: AtomicU64::new(1),
                slot: Mutex::new(TrackerSlot::default()),
            }),
        }
    }

    pub fn filter(&self) -> EventFilter {
        self.inner.filter
    }

    /// Rebind to `target`, moving every registered listener over.
    pub fn set_target(&self, target: Arc<dyn BlockSource>) {
        let mut slot = self.lock();
        let previous = slot.target.take();
        for attachment in slot.attachments.values_mut() {
            if let (Some(old), Some(id)) = (&previous, attachment.target_id.take()) {
                old.off(id);
            }
            attachment.target_id = Some(target.on(Arc::clone(&attachment.listener)));
        }
        slot.target = Some(target);
    }

    pub fn target(&self) -> Option<Arc<dyn BlockSource>> {
        self.lock().target.clone()
    }

    pub fn is_bound(&self) -> bool {
        self.lock().target.is_some()
    }

    /// Returns `true` if both handles are the same handle.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerSlot> {
        self.inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlockSource for BlockTrackerHandle {
    fn on(&self, listener: BlockListener) -> ListenerId {
        let filter = self.inner.filter;
        let filtered: BlockListener = Arc::new(move |event: &BlockEvent| {
            if filter.allows(event) {
                listener(event);
            }
        });
        let id = ListenerId::from_raw(self.inner.next_id.fetch_add(1, Ordering::Relaxed));

        let mut slot = self.lock();
        let target_id = slot
            .target
            .as_ref()
            .map(|target| target.on(Arc::clone(&filtered)));
        slot.attachments.insert(
            id,
            Attachment {
                listener: filtered,
                target_id,
            },
        );
        id
    }

    fn off(&self, id: ListenerId) -> bool {
        let mut slot = self.lock();
        let Some(attachment) = slot.attachments.remove(&id) else {
            return false;
        };
        if let (Some(target), Some(target_id)) = (&slot.target, attachment.target_id) {
            target.off(target_id);
        }
        true
    }

    fn latest(&self) -> Result<Option<u64>, TransportError> {
        let target = self
            .target()
            .ok_or(TransportError::Uninitialized { what: "block tracker" })?;
        target.latest()
    }

    fn listener_count(&self) -> usize {
        self.lock().attachments.len()
    }
}

impl std::fmt::Debug for BlockTrackerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.lock();
        f.debug_struct("BlockTrackerHandle")
            .field("filter", &self.inner.filter)
            .field("bound", &slot.target.is_some())
            .field("listeners", &slot.attachments.len())
            .finish()
    }
}
