//! Controller error type.

use thiserror::Error;

use chainswitch_core::error::{StoreError, TransportError};

/// Errors returned by [`NetworkController`](crate::NetworkController) operations.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// An argument failed validation; no state was changed.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A configuration names a network type dispatch does not know.
    #[error("unknown network type \"{0}\"")]
    UnknownNetworkType(String),

    /// A code path that validated input can never reach was reached.
    #[error("internal error: {0}")]
    Internal(String),

    /// The transport factory failed; the previous transport stays bound.
    #[error("failed to construct transport: {0}")]
    TransportConstruction(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl NetworkError {
    /// Returns `true` if the call was rejected before touching any state.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}
