//! Dice game backed by coordinator randomness.
//!
//! Demonstrates how a consumer integrates with the coordinator:
//!
//! 1. **Request**: [`DiceRoller::request_roll`] asks the coordinator for
//!    randomness, passing the player's identity as extra data.
//! 2. **Fulfill**: the operator answers through [`DiceRoller::fulfill`]; the
//!    coordinator derives the final value and hands it to [`DiceGame`].
//! 3. **Settle**: the game maps the first 8 bytes to a fair 1-6 result
//!    (u64 modulo 6, bias is negligible at 2^64 range).

use std::collections::BTreeMap;

use randomness_coordinator::{
    CoordinatorConfig, CoordinatorError, CoordinatorEvent, CoordinatorHooks, Fulfillment,
    Identity, Randomness, RandomnessCoordinator, RawRandomness, RequestId,
};
use serde::Serialize;
use tracing::info;

/// A dice roll backed by one randomness request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub player: Identity,
    pub request_id: RequestId,
    /// `None` while pending, `Some(1..=6)` once settled.
    pub result: Option<u8>,
}

/// Error codes for the roll-dice game.
#[derive(Debug, thiserror::Error)]
pub enum RollDiceError {
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
    /// Extra data did not carry a 32-byte player identity.
    #[error("extra data is not a player identity ({0} bytes)")]
    MalformedPlayer(usize),
    #[error("no dice roll for request {0}")]
    UnknownRoll(RequestId),
    #[error("dice roll {request_id} belongs to another player")]
    PlayerMismatch { request_id: RequestId },
    #[error("dice roll {0} has already been settled")]
    AlreadySettled(RequestId),
}

/// Coordinator hooks holding the rolls of every player.
#[derive(Debug, Clone)]
pub struct DiceGame {
    operator: Identity,
    rolls: BTreeMap<RequestId, DiceRoll>,
}

impl DiceGame {
    pub fn new(operator: Identity) -> Self {
        Self {
            operator,
            rolls: BTreeMap::new(),
        }
    }

    pub fn roll(&self, request_id: RequestId) -> Option<&DiceRoll> {
        self.rolls.get(&request_id)
    }

    pub fn rolls_for(&self, player: Identity) -> impl Iterator<Item = &DiceRoll> + '_ {
        self.rolls.values().filter(move |roll| roll.player == player)
    }

    /// Hand fulfillment rights to another operator.
    pub fn set_operator(&mut self, operator: Identity) {
        self.operator = operator;
    }
}

/// Map derived randomness onto a die face.
pub fn dice_value(randomness: &Randomness) -> u8 {
    (randomness.to_u64() % 6 + 1) as u8
}

impl CoordinatorHooks for DiceGame {
    type Error = RollDiceError;

    fn operator(&self) -> Identity {
        self.operator
    }

    fn on_randomness_fulfilled(
        &mut self,
        randomness: Randomness,
        request_id: RequestId,
        extra: &[u8],
    ) -> Result<(), RollDiceError> {
        let player = Identity::try_from(extra)
            .map_err(|_| RollDiceError::MalformedPlayer(extra.len()))?;
        let roll = self
            .rolls
            .get_mut(&request_id)
            .ok_or(RollDiceError::UnknownRoll(request_id))?;
        if roll.player != player {
            return Err(RollDiceError::PlayerMismatch { request_id });
        }
        if roll.result.is_some() {
            return Err(RollDiceError::AlreadySettled(request_id));
        }

        let value = dice_value(&randomness);
        roll.result = Some(value);

        info!(player = %player, request_id, result = value, "Dice rolled");
        Ok(())
    }
}

/// Dice game front end owning its coordinator.
pub struct DiceRoller {
    coordinator: RandomnessCoordinator<DiceGame>,
}

impl DiceRoller {
    pub fn new(config: &CoordinatorConfig) -> Self {
        Self {
            coordinator: RandomnessCoordinator::new(config, DiceGame::new(config.operator)),
        }
    }

    /// Request a dice roll for `player`. The roll stays pending until the
    /// operator fulfills the returned request.
    pub fn request_roll(&mut self, player: Identity) -> Result<RequestId, RollDiceError> {
        let request_id = self.coordinator.request_randomness(player.as_bytes())?;
        self.coordinator.hooks_mut().rolls.insert(
            request_id,
            DiceRoll {
                player,
                request_id,
                result: None,
            },
        );

        info!(player = %player, request_id, "Dice roll requested");
        Ok(request_id)
    }

    pub fn fulfill(
        &mut self,
        caller: &Identity,
        raw: RawRandomness,
        payload: &[u8],
    ) -> Result<Fulfillment, RollDiceError> {
        Ok(self.coordinator.fulfill_randomness(caller, raw, payload)?)
    }

    pub fn roll(&self, request_id: RequestId) -> Option<&DiceRoll> {
        self.coordinator.hooks().roll(request_id)
    }

    /// Drain the coordinator events the operator has not picked up yet.
    pub fn take_events(&mut self) -> Vec<CoordinatorEvent> {
        self.coordinator.take_events()
    }

    pub fn rolls_for(&self, player: Identity) -> impl Iterator<Item = &DiceRoll> + '_ {
        self.coordinator.hooks().rolls_for(player)
    }

    pub fn coordinator(&self) -> &RandomnessCoordinator<DiceGame> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut RandomnessCoordinator<DiceGame> {
        &mut self.coordinator
    }
}
