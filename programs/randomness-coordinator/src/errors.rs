use crate::payload::PayloadError;
use crate::state::Identity;

/// Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Boxed failure reported by a [`crate::CoordinatorHooks`] handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error codes for the coordinator.
///
/// A fulfillment naming a request that is not pending is not an error; it is
/// reported as [`crate::Fulfillment::Discarded`].
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// The caller is not the operator returned by the hooks.
    #[error("unauthorized fulfillment caller {caller}")]
    Unauthorized { caller: Identity },

    /// The fulfillment payload is not a valid `(request_id, extra)` encoding.
    #[error("invalid fulfillment payload: {0}")]
    Decode(#[from] PayloadError),

    /// The consumer handler failed; the request is still pending.
    #[error("fulfillment handler failed for request {request_id}")]
    Handler {
        request_id: u64,
        #[source]
        source: HandlerError,
    },

    /// Extra data too large to be carried in a request payload.
    #[error("extra data of {len} bytes is too large")]
    ExtraTooLarge { len: usize },

    /// The request id space is exhausted (practically unreachable).
    #[error("request counter overflow")]
    CounterOverflow,
}

impl CoordinatorError {
    /// Whether the operator may retry the same fulfillment later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Handler { .. })
    }
}
