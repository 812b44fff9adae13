//! Observable state containers.
//!
//! [`ObservableStore`] holds one value and notifies subscribers on every
//! replacement. Listeners run synchronously on the mutating call stack;
//! async consumers can follow the same value through [`ObservableStore::watch`].
//!
//! [`ComposedStore`] aggregates several named stores into one read-only JSON
//! view and notifies its own subscribers whenever any child changes.

use std::sync::{Arc, Weak};

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::listeners::{Listener, ListenerId, Listeners};

/// Shallow merge of a partial value into `self`.
pub trait Merge<P> {
    fn merge(&mut self, partial: P) -> Result<(), StoreError>;
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Merge<Value> for Value {
    /// Top-level keys of `partial` overwrite those of `self`. Both sides
    /// must be JSON objects; `self` is left untouched otherwise.
    fn merge(&mut self, partial: Value) -> Result<(), StoreError> {
        let Value::Object(target) = self else {
            return Err(StoreError::NotAMapping { found: kind_of(self) });
        };
        let Value::Object(patch) = partial else {
            return Err(StoreError::PatchNotAMapping { found: kind_of(&partial) });
        };
        target.extend(patch);
        Ok(())
    }
}

/// A mutable value plus the subscribers interested in it.
pub struct ObservableStore<T> {
    tx: watch::Sender<T>,
    listeners: Listeners<T>,
}

impl<T> ObservableStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            listeners: Listeners::new(),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value and notify subscribers.
    pub fn put(&self, value: T) {
        self.tx.send_replace(value.clone());
        self.listeners.emit(&value);
    }

    /// Shallow-merge `partial` into the current value and notify subscribers.
    ///
    /// On error the value is unchanged and nobody is notified.
    pub fn update<P>(&self, partial: P) -> Result<(), StoreError>
    where
        T: Merge<P>,
    {
        let mut outcome = Ok(());
        self.tx.send_if_modified(|current| match current.merge(partial) {
            Ok(()) => true,
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome?;
        self.listeners.emit(&self.get());
        Ok(())
    }

    /// Register a synchronous change listener.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// A `watch` receiver that observes every replacement.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T> std::fmt::Debug for ObservableStore<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableStore")
            .field("value", &*self.tx.borrow())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Type-erased view of a child store inside a [`ComposedStore`].
trait ChildStore: Send + Sync {
    fn snapshot(&self) -> Value;
    fn on_change(&self, notify: Arc<dyn Fn() + Send + Sync>) -> ListenerId;
}

impl<T> ChildStore for ObservableStore<T>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    fn snapshot(&self) -> Value {
        serde_json::to_value(self.get()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to serialize store value");
            Value::Null
        })
    }

    fn on_change(&self, notify: Arc<dyn Fn() + Send + Sync>) -> ListenerId {
        self.subscribe(move |_: &T| notify())
    }
}

struct ComposedInner {
    children: Vec<(String, Arc<dyn ChildStore>)>,
    listeners: Listeners<Value>,
}

impl ComposedInner {
    fn view(&self) -> Value {
        let map: Map<String, Value> = self
            .children
            .iter()
            .map(|(name, child)| (name.clone(), child.snapshot()))
            .collect();
        Value::Object(map)
    }
}

/// Read-only aggregate of several named [`ObservableStore`]s.
///
/// Cloning is cheap; all clones share the same children and subscribers.
#[derive(Clone)]
pub struct ComposedStore {
    inner: Arc<ComposedInner>,
}

impl ComposedStore {
    pub fn builder() -> ComposedStoreBuilder {
        ComposedStoreBuilder::default()
    }

    /// Current aggregate view: `{ <child name>: <child value>, ... }`.
    pub fn get(&self) -> Value {
        self.inner.view()
    }

    /// Register a listener fired with the full view after any child changes.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let listener: Listener<Value> = Arc::new(listener);
        self.inner.listeners.add(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Names of the composed children, in registration order.
    pub fn child_names(&self) -> Vec<&str> {
        self.inner.children.iter().map(|(n, _)| n.as_str()).collect()
    }
}

/// Builder collecting the children of a [`ComposedStore`].
#[derive(Default)]
pub struct ComposedStoreBuilder {
    children: Vec<(String, Arc<dyn ChildStore>)>,
}

impl ComposedStoreBuilder {
    /// Add a named child store.
    pub fn child<T>(mut self, name: impl Into<String>, store: Arc<ObservableStore<T>>) -> Self
    where
        T: Clone + Serialize + Send + Sync + 'static,
    {
        let store: Arc<dyn ChildStore> = store;
        self.children.push((name.into(), store));
        self
    }

    pub fn build(self) -> ComposedStore {
        let inner = Arc::new(ComposedInner {
            children: self.children,
            listeners: Listeners::new(),
        });
        for (_, child) in &inner.children {
            let weak: Weak<ComposedInner> = Arc::downgrade(&inner);
            child.on_change(Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let view = inner.view();
                    inner.listeners.emit(&view);
                }
            }));
        }
        ComposedStore { inner }
    }
}
