//! Mighty deed scenario tests

use funnel::combat::{EffectKind, ScriptedRoller, TradeGood};
use funnel::tracking::{AchievementEvent, BattleType, RecordKind};
use funnel::{ActionOutcome, Advance};

use crate::common::{goblin, peasant, Fight};

fn with_good(good: &str, monster_hp: i32, faces: &[u32]) -> Fight<ScriptedRoller> {
    let character = peasant(3, 8).with_trade_good(TradeGood::new(good));
    let faces = [15, 5].into_iter().chain(faces.iter().copied());
    let mut fight = Fight::scripted(character, goblin(12, monster_hp), faces);
    fight.encounter.start();
    fight
}

/// Scenario D: natural 20 with a 6 is a mighty critical, and only that
#[test]
fn test_twenty_and_six_is_mighty_critical() {
    // 20, deed 6, critical 1d6 twice (2, 3), flammable bonus 1d6 (4)
    let mut fight = with_good("Flask of oil", 20, &[20, 6, 2, 3, 4]);
    assert_eq!(fight.encounter.mighty_deed(), ActionOutcome::Continued);

    assert_eq!(fight.encounter.monster().hp, 11);
    let criticals = fight
        .encounter
        .log()
        .iter()
        .filter(|entry| entry.message().starts_with("Mighty critical!"))
        .count();
    assert_eq!(criticals, 1);
    assert!(!fight.logged("blow lands"));
    assert!(!fight.logged("deed falls flat"));
    assert!(fight.encounter.character().trade_good.is_none());
    assert!(fight.encounter.monster().ac_revealed);
}

#[test]
fn test_mighty_critical_kill_is_recorded() {
    let mut fight = with_good("Flask of oil", 5, &[20, 6, 2, 3, 4]);
    assert_eq!(fight.encounter.mighty_deed(), ActionOutcome::Finished);

    let records = fight.tracker.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, RecordKind::Victory);
    assert_eq!(records[0].1.battle_type, BattleType::MightyCritical);
    let events = fight.tracker.events();
    assert!(events.contains(&AchievementEvent::MightyDeed { critical: true }));
    assert!(events.contains(&AchievementEvent::Victory {
        monster: "Goblin".to_string(),
        tier: 0,
        boss: false
    }));
}

#[test]
fn test_natural_one_beats_deed_die() {
    // 1 with a 6 on the deed die; the hen pecks for 1d2 (2)
    let mut fight = with_good("Hen", 20, &[1, 6, 2]);
    assert_eq!(fight.encounter.mighty_deed(), ActionOutcome::Continued);

    assert!(fight.logged("Mighty fumble!"));
    assert_eq!(fight.encounter.monster().hp, 20);
    assert_eq!(fight.encounter.character().hp, 6);
    assert!(fight.encounter.character().trade_good.is_none());
    assert!(fight
        .encounter
        .character()
        .effects
        .has(EffectKind::AttackPenalty));
}

#[test]
fn test_twenty_without_six_is_an_ordinary_hit() {
    let mut fight = with_good("Hen", 20, &[20, 3, 5]);
    assert_eq!(fight.encounter.mighty_deed(), ActionOutcome::Continued);

    assert_eq!(fight.encounter.monster().hp, 15);
    assert!(fight.logged("does not come off"));
    assert!(!fight.logged("Critical hit!"));
    assert!(fight.encounter.character().trade_good.is_some());
}

#[test]
fn test_failed_deed_passes_the_turn() {
    let mut fight = with_good("Hen", 20, &[5, 6]);
    assert_eq!(fight.encounter.mighty_deed(), ActionOutcome::Continued);

    assert!(fight.logged("mighty deed fails"));
    assert_eq!(fight.encounter.monster().hp, 20);
    assert!(fight.encounter.character().trade_good.is_some());
    assert!(fight.encounter.has_scheduled_action());
    assert!(fight.encounter.pending_luck().is_none());
}

#[test]
fn test_binding_critical_pins_the_monster() {
    // 20 + 6, critical 1d6 twice (3, 3); then the pinned goblin loses its
    // turn and a 10 is enough against its exposed AC
    let mut fight = with_good("Coil of rope", 20, &[20, 6, 3, 3, 10, 1]);
    fight.encounter.mighty_deed();
    assert_eq!(fight.encounter.monster().hp, 14);
    assert!(fight
        .encounter
        .monster()
        .effects
        .has(EffectKind::SkipNextAction));

    assert_eq!(fight.encounter.advance(), Advance::Resolved);
    assert!(fight.logged("Goblin loses its action"));

    assert_eq!(fight.encounter.attack(), ActionOutcome::Continued);
    assert_eq!(fight.encounter.monster().hp, 13);
}

#[test]
fn test_deed_needs_a_started_fight() {
    let character = peasant(3, 8).with_trade_good(TradeGood::new("Hen"));
    let mut fight = Fight::scripted(character, goblin(12, 5), []);
    assert_eq!(fight.encounter.mighty_deed(), ActionOutcome::Ignored);
    assert!(fight.encounter.log().is_empty());
}
