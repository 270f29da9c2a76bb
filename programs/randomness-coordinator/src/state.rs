use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Sequential identifier of a randomness request, assigned from `0`.
pub type RequestId = u64;

/// Identity of the chain the coordinator is deployed on.
pub type ChainId = u64;

/// A 32-byte principal: the operator, a caller, or the coordinator instance.
///
/// Rendered and parsed as base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity([u8; 32]);

impl Identity {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The all-zero identity, which configuration never accepts.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<[u8; 32]> for Identity {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Identity {
    type Error = IdentityError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| IdentityError::WrongLength(bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({self})")
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| IdentityError::InvalidBase58(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Failure to build an [`Identity`] from raw bytes or text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity must be 32 bytes, got {0}")]
    WrongLength(usize),
    #[error("invalid base58 identity: {0}")]
    InvalidBase58(String),
}

/// Append-only record of every request ever issued.
///
/// Slot `i` exists iff request `i` was issued; `pending[i]` is true until that
/// request is fulfilled. Slots are never removed, so ids never repeat.
///
/// [`push`](Self::push) refuses to grow past `RequestId::MAX`, so every index
/// in the table fits a [`RequestId`].
#[derive(Debug, Clone, Default)]
pub struct PendingTable {
    pending: Vec<bool>,
    open: usize,
}

/// Outcome of looking up a request id in the [`PendingTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never issued.
    Unknown,
    Pending,
    Fulfilled,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests ever issued; also the next id to hand out.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of requests ever issued, as a [`RequestId`] count.
    pub fn issued(&self) -> RequestId {
        index_to_id(self.pending.len())
    }

    /// Number of issued requests still awaiting fulfillment.
    pub fn open(&self) -> RequestId {
        index_to_id(self.open)
    }

    /// Append a new pending slot and return its id.
    ///
    /// Returns `None` when the next id would not fit a [`RequestId`].
    pub fn push(&mut self) -> Option<RequestId> {
        let id = RequestId::try_from(self.pending.len()).ok()?;
        self.pending.push(true);
        self.open += 1;
        Some(id)
    }

    pub fn state(&self, id: RequestId) -> SlotState {
        let Ok(index) = usize::try_from(id) else {
            return SlotState::Unknown;
        };
        match self.pending.get(index) {
            None => SlotState::Unknown,
            Some(true) => SlotState::Pending,
            Some(false) => SlotState::Fulfilled,
        }
    }

    pub fn is_pending(&self, id: RequestId) -> bool {
        self.state(id) == SlotState::Pending
    }

    /// Clear the pending flag of `id`. Returns whether a pending slot was cleared.
    pub fn fulfill(&mut self, id: RequestId) -> bool {
        let Ok(index) = usize::try_from(id) else {
            return false;
        };
        match self.pending.get_mut(index) {
            Some(slot) if *slot => {
                *slot = false;
                self.open -= 1;
                true
            }
            _ => false,
        }
    }

    /// Ids still pending, ascending.
    pub fn pending_ids(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, pending)| **pending)
            .map(|(index, _)| index_to_id(index))
    }
}

// Lossless for any length the table can reach; see `PendingTable::push`.
fn index_to_id(index: usize) -> RequestId {
    index as RequestId
}
