//! Transport- and store-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur during an RPC transport operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The endpoint URL could not be parsed.
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A stable handle was used before any target was bound to it.
    #[error("{what} is not initialized: no network has been configured yet")]
    Uninitialized { what: &'static str },

    /// No middleware layer produced a response for the request.
    #[error("Request for '{method}' was not handled by any middleware")]
    Unhandled { method: String },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

/// Errors raised by [`ObservableStore`](crate::store::ObservableStore) updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// `update` was called on a store whose current value is not a mapping.
    #[error("cannot merge into a non-mapping value (found {found})")]
    NotAMapping { found: &'static str },

    /// The partial update itself is not a mapping.
    #[error("partial update must be a mapping (found {found})")]
    PatchNotAMapping { found: &'static str },
}
