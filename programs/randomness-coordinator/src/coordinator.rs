use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::CoordinatorConfig;
use crate::errors::{CoordinatorError, Result};
use crate::events::{CoordinatorEvent, DiscardReason, RandomnessFulfilled, RandomnessRequested};
use crate::hooks::CoordinatorHooks;
use crate::metrics::CoordinatorMetrics;
use crate::payload::{self, RequestPayload};
use crate::randomness::{derive_randomness, RawRandomness, Randomness};
use crate::state::{ChainId, Identity, PendingTable, RequestId, SlotState};

/// Events kept for [`RandomnessCoordinator::take_events`] before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// What an authorized, well-formed fulfillment call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fulfillment {
    /// The handler ran and the request is no longer pending.
    Delivered {
        request_id: RequestId,
        randomness: Randomness,
    },
    /// The request was unknown or already fulfilled; nothing happened.
    Discarded {
        request_id: RequestId,
        reason: DiscardReason,
    },
}

/// Owns the pending table, allocates request ids, checks the operator and
/// dispatches derived randomness to the hooks.
///
/// ## Request lifecycle
///
/// 1. **Request**: [`request_randomness`](Self::request_randomness) appends a
///    pending slot and emits [`RandomnessRequested`].
/// 2. **Fulfill**: the operator calls
///    [`fulfill_randomness`](Self::fulfill_randomness) with a raw value and the
///    echoed payload; the derived value reaches the hooks exactly once and the
///    slot stops being pending.
///
/// Every mutating call takes `&mut self`, so operations never interleave. A
/// fulfillment only touches the table after the handler has succeeded.
///
/// Emitted events wait in a bounded buffer until drained with
/// [`take_events`](Self::take_events); once it holds `event_capacity` events
/// the oldest one is dropped for each new one.
pub struct RandomnessCoordinator<H> {
    instance: Identity,
    chain_id: ChainId,
    hooks: H,
    table: PendingTable,
    events: VecDeque<CoordinatorEvent>,
    event_capacity: usize,
    metrics: Arc<CoordinatorMetrics>,
}

impl<H: CoordinatorHooks> RandomnessCoordinator<H> {
    pub fn new(config: &CoordinatorConfig, hooks: H) -> Self {
        Self::with_identity(config.instance, config.chain_id, hooks)
    }

    pub fn with_identity(instance: Identity, chain_id: ChainId, hooks: H) -> Self {
        Self {
            instance,
            chain_id,
            hooks,
            table: PendingTable::new(),
            events: VecDeque::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            metrics: Arc::new(CoordinatorMetrics::new()),
        }
    }

    /// Report into a shared metrics instance instead of a private one.
    pub fn with_metrics(mut self, metrics: Arc<CoordinatorMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Keep at most `capacity` undrained events. Zero disables buffering.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self.events.truncate(capacity);
        self
    }

    /// The identity currently authorized to fulfill.
    pub fn operator(&self) -> Identity {
        self.hooks.operator()
    }

    /// Issue a new randomness request carrying `extra`.
    ///
    /// 1. Allocates the next id (the current table length) as pending.
    /// 2. Emits [`RandomnessRequested`] with the encoded `(id, extra)` payload.
    pub fn request_randomness(&mut self, extra: &[u8]) -> Result<RequestId> {
        let extra_len = u32::try_from(extra.len())
            .map_err(|_| CoordinatorError::ExtraTooLarge { len: extra.len() })?;
        let request_id = self
            .table
            .push()
            .ok_or(CoordinatorError::CounterOverflow)?;
        let payload = payload::encode_with_len(request_id, extra_len, extra);

        self.metrics.record_request();
        info!(request_id, extra_len = extra.len(), "Randomness requested");

        self.emit(CoordinatorEvent::RandomnessRequested(RandomnessRequested {
            request_id,
            payload,
        }));

        Ok(request_id)
    }

    /// Deliver the operator's raw value for the request named in `payload`.
    ///
    /// 1. Rejects any caller other than [`operator`](Self::operator).
    /// 2. Decodes `payload` into `(request_id, extra)`.
    /// 3. Derives the domain-separated randomness.
    /// 4. Discards the call if the request is not pending.
    /// 5. Runs the handler, then clears the pending flag.
    ///
    /// On any error the table is left as it was.
    #[instrument(skip_all, fields(caller = %caller, request_id = tracing::field::Empty))]
    pub fn fulfill_randomness(
        &mut self,
        caller: &Identity,
        raw: RawRandomness,
        payload: &[u8],
    ) -> Result<Fulfillment> {
        if *caller != self.hooks.operator() {
            self.metrics.record_unauthorized();
            warn!("Rejected fulfillment from non-operator");
            return Err(CoordinatorError::Unauthorized { caller: *caller });
        }

        let RequestPayload { request_id, extra } = match RequestPayload::decode(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.metrics.record_decode_failure();
                warn!(error = %e, "Rejected malformed fulfillment payload");
                return Err(e.into());
            }
        };
        tracing::Span::current().record("request_id", request_id);

        let randomness = derive_randomness(&raw, &self.instance, self.chain_id, request_id);

        let reason = match self.table.state(request_id) {
            SlotState::Pending => None,
            SlotState::Unknown => Some(DiscardReason::UnknownRequest),
            SlotState::Fulfilled => Some(DiscardReason::AlreadyFulfilled),
        };
        if let Some(reason) = reason {
            self.metrics.record_discard();
            warn!(?reason, "Discarding fulfillment for request that is not pending");
            return Ok(Fulfillment::Discarded { request_id, reason });
        }

        if let Err(e) = self
            .hooks
            .on_randomness_fulfilled(randomness, request_id, &extra)
        {
            self.metrics.record_handler_failure();
            error!(error = %e, "Fulfillment handler failed, request stays pending");
            return Err(CoordinatorError::Handler {
                request_id,
                source: Box::new(e),
            });
        }

        self.table.fulfill(request_id);
        self.metrics.record_delivery();
        info!(%randomness, "Fulfilled successfully");

        self.emit(CoordinatorEvent::RandomnessFulfilled(RandomnessFulfilled {
            request_id,
            randomness,
        }));

        Ok(Fulfillment::Delivered {
            request_id,
            randomness,
        })
    }

    /// Number of requests ever issued.
    pub fn request_count(&self) -> u64 {
        self.table.issued()
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        self.table.is_pending(request_id)
    }

    pub fn pending_count(&self) -> u64 {
        self.table.open()
    }

    /// Ids still awaiting fulfillment, ascending.
    ///
    /// An operator restarting after downtime can scan this to catch up.
    pub fn pending_requests(&self) -> Vec<RequestId> {
        self.table.pending_ids().collect()
    }

    /// Drain the events emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<CoordinatorEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, event: CoordinatorEvent) {
        if self.event_capacity == 0 {
            return;
        }
        if self.events.len() >= self.event_capacity {
            self.events.pop_front();
            self.metrics.record_event_dropped();
            warn!("Event buffer full, dropping oldest undrained event");
        }
        self.events.push_back(event);
    }

    pub fn instance(&self) -> Identity {
        self.instance
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn metrics(&self) -> &Arc<CoordinatorMetrics> {
        &self.metrics
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }
}
