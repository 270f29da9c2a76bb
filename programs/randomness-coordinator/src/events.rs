use serde::Serialize;

use crate::randomness::Randomness;
use crate::state::RequestId;

/// Emitted when a new randomness request is created.
///
/// The off-chain operator watches for these and answers with
/// `fulfill_randomness(raw, payload)`, echoing `payload` back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomnessRequested {
    pub request_id: RequestId,
    /// Encoded `(request_id, extra)`; see [`crate::payload`].
    pub payload: Vec<u8>,
}

/// Emitted when a request was fulfilled and its handler succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomnessFulfilled {
    pub request_id: RequestId,
    pub randomness: Randomness,
}

/// Why an authorized fulfillment was ignored. Discards emit no event; they
/// are logged and counted instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// The id was never issued by this coordinator.
    UnknownRequest,
    AlreadyFulfilled,
}

/// Every event the coordinator emits, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum CoordinatorEvent {
    RandomnessRequested(RandomnessRequested),
    RandomnessFulfilled(RandomnessFulfilled),
}
