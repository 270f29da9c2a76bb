use randomness_coordinator::payload;
use randomness_coordinator::{
    derive_randomness, raw_from_u64, CoordinatorConfig, CoordinatorError, CoordinatorEvent,
    DiscardReason, Fulfillment, Identity,
};
use roll_dice::{dice_value, DiceRoller, RollDiceError};

const INSTANCE: Identity = Identity::new([0x44; 32]);
const OPERATOR: Identity = Identity::new([0x0B; 32]);
const ALICE: Identity = Identity::new([0xA1; 32]);
const BOB: Identity = Identity::new([0xB0; 32]);

fn roller() -> DiceRoller {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    DiceRoller::new(&CoordinatorConfig::new(INSTANCE, 1, OPERATOR))
}

#[test]
fn roll_settles_from_derived_randomness() {
    let mut roller = roller();
    let request_id = roller.request_roll(ALICE).unwrap();
    assert_eq!(roller.roll(request_id).unwrap().result, None);

    let raw = raw_from_u64(42);
    let outcome = roller
        .fulfill(&OPERATOR, raw, &payload::encode(request_id, ALICE.as_bytes()).unwrap())
        .unwrap();

    let expected = derive_randomness(&raw, &INSTANCE, 1, request_id);
    assert_eq!(
        outcome,
        Fulfillment::Delivered {
            request_id,
            randomness: expected,
        }
    );
    assert_eq!(
        roller.roll(request_id).unwrap().result,
        Some(dice_value(&expected))
    );
    assert!(!roller.coordinator().is_pending(request_id));
}

#[test]
fn second_fulfillment_does_not_reroll() {
    let mut roller = roller();
    let request_id = roller.request_roll(ALICE).unwrap();
    let payload = payload::encode(request_id, ALICE.as_bytes()).unwrap();

    roller.fulfill(&OPERATOR, raw_from_u64(1), &payload).unwrap();
    let first = roller.roll(request_id).unwrap().result;

    let outcome = roller.fulfill(&OPERATOR, raw_from_u64(2), &payload).unwrap();
    assert!(matches!(
        outcome,
        Fulfillment::Discarded {
            reason: DiscardReason::AlreadyFulfilled,
            ..
        }
    ));
    assert_eq!(roller.roll(request_id).unwrap().result, first);
}

#[test]
fn forged_player_keeps_roll_pending() {
    let mut roller = roller();
    let request_id = roller.request_roll(ALICE).unwrap();

    let err = roller
        .fulfill(
            &OPERATOR,
            raw_from_u64(3),
            &payload::encode(request_id, BOB.as_bytes()).unwrap(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        RollDiceError::Coordinator(CoordinatorError::Handler { .. })
    ));
    assert!(roller.coordinator().is_pending(request_id));
    assert_eq!(roller.roll(request_id).unwrap().result, None);

    roller
        .fulfill(
            &OPERATOR,
            raw_from_u64(3),
            &payload::encode(request_id, ALICE.as_bytes()).unwrap(),
        )
        .unwrap();
    assert!(roller.roll(request_id).unwrap().result.is_some());
}

#[test]
fn only_the_operator_can_settle() {
    let mut roller = roller();
    let request_id = roller.request_roll(ALICE).unwrap();

    let err = roller
        .fulfill(
            &ALICE,
            raw_from_u64(6),
            &payload::encode(request_id, ALICE.as_bytes()).unwrap(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        RollDiceError::Coordinator(CoordinatorError::Unauthorized { .. })
    ));
    assert_eq!(roller.roll(request_id).unwrap().result, None);
}

#[test]
fn rotated_operator_takes_over() {
    let mut roller = roller();
    let request_id = roller.request_roll(BOB).unwrap();
    let payload = payload::encode(request_id, BOB.as_bytes()).unwrap();
    let next_operator = Identity::new([0x0C; 32]);

    roller.coordinator_mut().hooks_mut().set_operator(next_operator);

    assert!(roller.fulfill(&OPERATOR, raw_from_u64(9), &payload).is_err());
    roller.fulfill(&next_operator, raw_from_u64(9), &payload).unwrap();
    assert!(roller.roll(request_id).unwrap().result.is_some());
}

#[test]
fn rolls_are_tracked_per_player() {
    let mut roller = roller();
    let a0 = roller.request_roll(ALICE).unwrap();
    let b0 = roller.request_roll(BOB).unwrap();
    let a1 = roller.request_roll(ALICE).unwrap();

    let alice: Vec<_> = roller.rolls_for(ALICE).map(|roll| roll.request_id).collect();
    let bob: Vec<_> = roller.rolls_for(BOB).map(|roll| roll.request_id).collect();

    assert_eq!(alice, vec![a0, a1]);
    assert_eq!(bob, vec![b0]);
    assert_eq!(roller.coordinator().pending_requests(), vec![0, 1, 2]);
}

#[test]
fn operator_drains_request_events_and_answers_them() {
    let mut roller = roller();
    roller.request_roll(ALICE).unwrap();
    roller.request_roll(BOB).unwrap();

    let requests: Vec<_> = roller
        .take_events()
        .into_iter()
        .filter_map(|event| match event {
            CoordinatorEvent::RandomnessRequested(requested) => Some(requested),
            CoordinatorEvent::RandomnessFulfilled(_) => None,
        })
        .collect();
    assert_eq!(requests.len(), 2);
    assert!(roller.take_events().is_empty());

    for requested in &requests {
        roller
            .fulfill(&OPERATOR, raw_from_u64(77), &requested.payload)
            .unwrap();
    }

    let fulfilled = roller.take_events();
    assert_eq!(fulfilled.len(), 2);
    assert!(fulfilled
        .iter()
        .all(|event| matches!(event, CoordinatorEvent::RandomnessFulfilled(_))));
    assert!(roller.take_events().is_empty());
    assert!(roller.rolls_for(ALICE).all(|roll| roll.result.is_some()));
    assert!(roller.rolls_for(BOB).all(|roll| roll.result.is_some()));
}
