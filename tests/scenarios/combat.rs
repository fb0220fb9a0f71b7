//! Combat scenario tests
//!
//! Hits, fumbles, termination, and the properties every encounter keeps

use funnel::combat::{
    roll_swing, CombatStatus, DieRoller, LuckDecision, Outcome, RandomRoller, SwingSetup,
};
use funnel::tracking::{BattleType, RecordKind};
use funnel::{ActionOutcome, Advance, Encounter};

use crate::common::{goblin, peasant, Fight};

/// Play a fight to the end, calling `check` after every step
fn play_out<R: DieRoller>(
    fight: &mut Fight<R>,
    decision: LuckDecision,
    mut check: impl FnMut(&Encounter<R>),
) {
    fight.encounter.start();
    while fight.encounter.status() != CombatStatus::Finished {
        if fight.encounter.round() >= 500 {
            fight.encounter.flee();
            break;
        }
        fight.settle();
        check(&fight.encounter);
        fight.exchange(decision);
        check(&fight.encounter);
    }
}

/// Scenario A: 15 against AC 12 hits for 1d6
#[test]
fn test_plain_hit_damage_in_range() {
    for face in 1..=6 {
        let mut fight = Fight::scripted(peasant(3, 8), goblin(12, 20), [15, 5, 15, face]);
        fight.encounter.start();
        assert_eq!(fight.encounter.attack(), ActionOutcome::Continued);

        let dealt = 20 - fight.encounter.monster().hp;
        assert_eq!(dealt, face as i32);
        assert!((1..=6).contains(&dealt));
        assert!(fight.encounter.monster().ac_revealed);
    }
}

/// Scenario B: a natural 1 deals no damage to the monster
#[test]
fn test_fumble_never_damages_monster() {
    for fumble_die in 1..=4 {
        let mut fight = Fight::scripted(peasant(3, 8), goblin(12, 20), [15, 5, 1, fumble_die]);
        fight.encounter.start();
        fight.encounter.attack();

        assert!(fight.logged("Fumble!"));
        assert_eq!(fight.encounter.monster().hp, 20);
        assert!(!fight.encounter.monster().ac_revealed);
        if fumble_die == 4 {
            assert!(fight.encounter.character().hp < 8);
        } else {
            assert_eq!(fight.encounter.character().hp, 8);
        }
    }
}

/// Scenario E: the killing blow ends the fight before any counter-attack
#[test]
fn test_kill_ends_fight_before_counter() {
    let mut fight = Fight::scripted(peasant(3, 8), goblin(12, 5), [15, 5, 15, 6]);
    fight.encounter.start();
    assert_eq!(fight.encounter.attack(), ActionOutcome::Finished);
    assert_eq!(fight.encounter.status(), CombatStatus::Finished);
    assert!(!fight.encounter.has_scheduled_action());

    let entries = fight.encounter.log().len();
    assert_eq!(fight.encounter.advance(), Advance::Idle);
    assert_eq!(fight.encounter.log().len(), entries);
    assert_eq!(fight.summaries().len(), 1);
    assert_eq!(fight.tracker.count(RecordKind::Victory), 1);
    assert_eq!(fight.encounter.character().hp, 8);
}

/// A fleeing character leaves the queued counter-attack with nothing to do
#[test]
fn test_queued_counter_cancelled_by_flight() {
    let mut fight = Fight::scripted(peasant(3, 8), goblin(12, 5), [5, 15]);
    fight.encounter.start();
    assert!(fight.encounter.has_scheduled_action());

    fight.encounter.flee();
    let entries = fight.encounter.log().len();
    assert_eq!(fight.encounter.advance(), Advance::Cancelled);
    assert_eq!(fight.encounter.log().len(), entries);
    assert_eq!(fight.encounter.outcome(), Some(Outcome::Fled));
    assert_eq!(fight.encounter.summary(), Some("Wat ran away from Goblin."));
}

#[test]
fn test_monster_fumbles_itself_to_death() {
    // Goblin goes first, rolls a 1, then strikes itself for 4
    let mut fight = Fight::scripted(peasant(3, 8), goblin(12, 3), [5, 15, 1, 4, 4]);
    fight.encounter.start();
    assert_eq!(fight.encounter.advance(), Advance::Resolved);

    assert_eq!(fight.encounter.outcome(), Some(Outcome::Victory));
    let records = fight.tracker.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].1.battle_type, BattleType::FumbleSelfKill);
    assert_eq!(fight.encounter.attack(), ActionOutcome::Ignored);
}

#[test]
fn test_monster_critical_rolls_dice_twice() {
    let mut fight = Fight::scripted(peasant(3, 20), goblin(12, 5), [5, 15, 20, 3, 4]);
    fight.encounter.start();
    fight.encounter.advance();
    assert_eq!(fight.encounter.character().hp, 13);
    assert!(fight.logged("Critical hit! Goblin hits Wat for 7 (3 + 4)"));
}

#[test]
fn test_natural_twenty_and_one_never_overlap() {
    let mut roller = RandomRoller::seeded(7);
    for ability in [-3, 0, 3] {
        let setup = SwingSetup {
            ability_modifier: ability,
            effect_modifier: 0,
            target_ac: 12,
            luck_available: Some(2),
        };
        for _ in 0..500 {
            let swing = roll_swing(&setup, &mut roller);
            if swing.raw == 20 {
                assert!(!swing.is_fumble());
                assert!(swing.is_hit());
            }
            if swing.raw == 1 {
                assert!(!swing.is_hit());
            }
        }
    }
}

#[test]
fn test_every_fight_concludes_once_and_keeps_bounds() {
    for seed in 0..100 {
        let mut fight = Fight::seeded(peasant(9, 6), goblin(12, 6), seed);
        let mut revealed = false;
        play_out(&mut fight, LuckDecision::Burn(1), |encounter| {
            assert!(encounter.character().hp >= 0);
            assert!(encounter.monster().hp >= 0);
            assert!(encounter.character().luck >= 0);
            assert!(encounter.character().luck <= encounter.character().original_luck());
            // The AC latch never closes again
            if revealed {
                assert!(encounter.monster().ac_revealed, "seed {seed}");
            }
            revealed = encounter.monster().ac_revealed;
        });

        assert_eq!(fight.encounter.status(), CombatStatus::Finished);
        assert_eq!(fight.summaries().len(), 1, "seed {seed}");
        assert_eq!(fight.tracker.records().len(), 1, "seed {seed}");
        let summary = fight.encounter.log().last().map(|entry| entry.is_summary());
        assert_eq!(summary, Some(true), "summary must be the last entry");

        match fight.encounter.outcome() {
            Some(Outcome::Victory) => assert_eq!(fight.encounter.monster().hp, 0),
            Some(Outcome::Defeat) => assert_eq!(fight.encounter.character().hp, 0),
            other => panic!("seed {seed}: unexpected outcome {other:?}"),
        }
    }
}

#[test]
fn test_hp_clamped_at_zero() {
    let mut character = peasant(3, 4);
    assert_eq!(character.take_damage(10), 4);
    for _ in 0..3 {
        assert_eq!(character.take_damage(5), 0);
        assert_eq!(character.hp, 0);
    }
}
