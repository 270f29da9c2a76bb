//! Randomness coordinator.
//!
//! Allocates request ids for externally sourced randomness and consumes the
//! operator's answers. A consumer calls
//! [`RandomnessCoordinator::request_randomness`] and gets back a sequential
//! [`RequestId`]; the off-chain operator observes the
//! [`RandomnessRequested`](events::RandomnessRequested) event and later calls
//! [`RandomnessCoordinator::fulfill_randomness`] with a raw 256-bit value and
//! the echoed payload.
//!
//! The raw value is never handed over directly. It is hashed together with
//! the coordinator instance, the chain id and the request id (see
//! [`randomness`]), and the result is delivered to the deployment's
//! [`CoordinatorHooks`] exactly once per request.
//!
//! Fulfillments for unknown or already fulfilled ids are tolerated as no-ops
//! so the operator can retry freely; they are reported as
//! [`Fulfillment::Discarded`], logged and counted.

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod events;
pub mod hooks;
pub mod metrics;
pub mod payload;
pub mod randomness;
pub mod state;

pub use config::CoordinatorConfig;
pub use coordinator::{Fulfillment, RandomnessCoordinator, DEFAULT_EVENT_CAPACITY};
pub use errors::{CoordinatorError, HandlerError, Result};
pub use events::{CoordinatorEvent, DiscardReason};
pub use hooks::CoordinatorHooks;
pub use metrics::CoordinatorMetrics;
pub use payload::{PayloadError, RequestPayload};
pub use randomness::{derive_randomness, raw_from_u64, RawRandomness, Randomness};
pub use state::{ChainId, Identity, RequestId};
