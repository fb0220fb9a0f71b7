//! Common test utilities - fixtures and a scripted encounter harness

#![allow(dead_code)]

use std::sync::Arc;

use funnel::combat::{DieRoller, LogEntry, LuckDecision, RandomRoller, ScriptedRoller};
use funnel::combatants::{Abilities, Character, Monster, Weapon};
use funnel::tracking::InMemoryTracker;
use funnel::{ActionOutcome, Advance, Encounter, EngineConfig};

/// Plain peasant: all abilities 10 except Luck
pub fn peasant(luck: i32, hp: i32) -> Character {
    let abilities = Abilities {
        luck,
        ..Abilities::default()
    };
    Character::new("Wat", abilities, hp)
        .with_occupation("Gongfarmer")
        .with_weapon(Weapon::new("Trowel", "1d6"))
}

pub fn goblin(ac: i32, hp: i32) -> Monster {
    Monster::new("Goblin", ac, "+1", "1d4", hp)
}

pub fn quick_config() -> EngineConfig {
    EngineConfig {
        pacing_ms: 0,
        ..EngineConfig::default()
    }
}

/// An encounter wired to an in-memory tracker
pub struct Fight<R: DieRoller> {
    pub encounter: Encounter<R>,
    pub tracker: Arc<InMemoryTracker>,
}

impl Fight<ScriptedRoller> {
    /// Encounter whose dice replay `faces`
    pub fn scripted(
        character: Character,
        monster: Monster,
        faces: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self::with_roller(character, monster, ScriptedRoller::new(faces))
    }
}

impl Fight<RandomRoller<rand::rngs::StdRng>> {
    pub fn seeded(character: Character, monster: Monster, seed: u64) -> Self {
        Self::with_roller(character, monster, RandomRoller::seeded(seed))
    }
}

impl<R: DieRoller> Fight<R> {
    pub fn with_roller(character: Character, monster: Monster, roller: R) -> Self {
        let tracker = InMemoryTracker::new();
        let encounter =
            Encounter::new(character, monster, quick_config(), roller).with_tracker(tracker.clone());
        Self { encounter, tracker }
    }

    /// Whether any log line contains `text`
    pub fn logged(&self, text: &str) -> bool {
        self.encounter
            .log()
            .iter()
            .any(|entry| entry.message().contains(text))
    }

    pub fn summaries(&self) -> Vec<&LogEntry> {
        self.encounter
            .log()
            .iter()
            .filter(|entry| entry.is_summary())
            .collect()
    }

    /// Run every scheduled continuation
    pub fn settle(&mut self) {
        while self.encounter.advance() != Advance::Idle {}
    }

    /// Play one character action (attack, answering luck with `decision`)
    /// and let the monster reply
    pub fn exchange(&mut self, decision: LuckDecision) -> ActionOutcome {
        let mut outcome = self.encounter.attack();
        if outcome == ActionOutcome::AwaitingLuck {
            outcome = self
                .encounter
                .decide_luck(decision)
                .unwrap_or(ActionOutcome::Ignored);
        }
        self.settle();
        outcome
    }
}
