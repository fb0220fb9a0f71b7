//! Luck negotiation scenario tests

use funnel::combat::{CombatError, CombatStatus, LuckDecision};
use funnel::ActionOutcome;

use crate::common::{goblin, peasant, Fight};

/// Scenario C: AC 15, total 13, Luck 3
fn near_miss(extra_faces: &[u32]) -> Fight<funnel::combat::ScriptedRoller> {
    let faces = [15, 5, 13].into_iter().chain(extra_faces.iter().copied());
    let mut fight = Fight::scripted(peasant(3, 8), goblin(15, 10), faces);
    fight.encounter.start();
    assert_eq!(fight.encounter.attack(), ActionOutcome::AwaitingLuck);
    fight
}

#[test]
fn test_offer_shows_shortfall() {
    let fight = near_miss(&[]);
    let offer = fight.encounter.pending_luck().unwrap();
    assert_eq!(offer.raw, 13);
    assert_eq!(offer.total, 13);
    assert_eq!(offer.shortfall, 2);
    assert_eq!(offer.luck_available, 3);
    assert!(!fight.encounter.has_scheduled_action());
}

#[test]
fn test_decline_finalizes_miss() {
    let mut fight = near_miss(&[]);
    assert_eq!(
        fight.encounter.decide_luck(LuckDecision::Decline),
        Ok(ActionOutcome::Continued)
    );
    assert_eq!(fight.encounter.character().luck, 3);
    assert_eq!(fight.encounter.monster().hp, 10);
    assert!(!fight.encounter.monster().ac_revealed);
    assert_eq!(fight.encounter.status(), CombatStatus::InProgress);
    // The counter-attack still comes
    assert!(fight.encounter.has_scheduled_action());
}

#[test]
fn test_burn_two_converts_to_hit() {
    let mut fight = near_miss(&[4]);
    assert_eq!(
        fight.encounter.decide_luck(LuckDecision::Burn(2)),
        Ok(ActionOutcome::Continued)
    );
    assert_eq!(fight.encounter.character().luck, 1);
    assert_eq!(fight.encounter.monster().hp, 6);
    assert!(fight.encounter.monster().ac_revealed);
    assert!(fight.logged("the gamble pays off"));
    assert!(!fight.logged("Critical hit!"));
    assert!(fight.encounter.has_scheduled_action());
}

#[test]
fn test_short_burn_still_misses_and_costs_luck() {
    let mut fight = near_miss(&[]);
    fight.encounter.decide_luck(LuckDecision::Burn(1)).unwrap();
    assert_eq!(fight.encounter.character().luck, 2);
    assert_eq!(fight.encounter.monster().hp, 10);
    assert!(!fight.encounter.monster().ac_revealed);
    assert!(fight.logged("the gamble fails"));
}

#[test]
fn test_invalid_burns_change_nothing() {
    let mut fight = near_miss(&[]);
    let entries = fight.encounter.log().len();
    for amount in [0, -2, 4] {
        assert_eq!(
            fight.encounter.decide_luck(LuckDecision::Burn(amount)),
            Err(CombatError::InvalidLuckBurn {
                requested: amount,
                available: 3
            })
        );
    }
    assert_eq!(fight.encounter.log().len(), entries);
    assert_eq!(fight.encounter.character().luck, 3);
    assert_eq!(fight.encounter.status(), CombatStatus::AwaitingLuckDecision);
    assert!(fight.encounter.pending_luck().is_some());
}

#[test]
fn test_other_actions_wait_for_decision() {
    let mut fight = near_miss(&[]);
    assert_eq!(fight.encounter.attack(), ActionOutcome::Ignored);
    assert_eq!(fight.encounter.mighty_deed(), ActionOutcome::Ignored);
    assert_eq!(fight.encounter.round(), 1);
}

#[test]
fn test_flee_during_negotiation() {
    let mut fight = near_miss(&[]);
    assert_eq!(fight.encounter.flee(), ActionOutcome::Finished);
    assert!(fight.encounter.pending_luck().is_none());
    assert_eq!(
        fight.encounter.decide_luck(LuckDecision::Burn(1)),
        Err(CombatError::NoDecisionPending)
    );
    assert_eq!(fight.encounter.character().luck, 3);
}

#[test]
fn test_no_luck_no_negotiation() {
    let mut fight = Fight::scripted(peasant(0, 8), goblin(15, 10), [15, 5, 14]);
    fight.encounter.start();
    assert_eq!(fight.encounter.attack(), ActionOutcome::Continued);
    assert!(fight.encounter.pending_luck().is_none());
}

#[test]
fn test_luck_never_rises_within_a_fight() {
    for seed in 0..50 {
        let mut fight = Fight::seeded(peasant(12, 8), goblin(14, 8), seed);
        fight.encounter.start();
        let before = fight.encounter.character().luck;
        let mut last = before;
        while fight.encounter.status() != CombatStatus::Finished && fight.encounter.round() < 300 {
            fight.exchange(LuckDecision::Burn(1));
            let luck = fight.encounter.character().luck;
            assert!(luck <= last, "seed {seed}: Luck rose from {last} to {luck}");
            assert!(luck >= 0);
            last = luck;
        }

        fight.encounter.restart();
        assert_eq!(fight.encounter.character().luck, before);
    }
}
