//! Attack resolution
//!
//! One swing of one attacker against one defender:
//! 1. Roll a d20
//! 2. Add the ability modifier and any consumed effect modifiers
//! 3. Compare against the defender's effective AC
//! 4. Classify: natural 20 is a critical hit, natural 1 a fumble
//!
//! The swing itself touches no combatant. The encounter consumes effects
//! before the roll and applies damage afterwards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::damage::{roll_critical_damage, roll_damage, DamageRoll};
use super::dice::{is_critical, is_fumble, roll_d20, DieRoller};

/// Everything a swing needs, gathered before the die is thrown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwingSetup {
    /// Strength/Agility modifier, or a monster's attack bonus
    pub ability_modifier: i32,
    /// Net attack modifier from the attacker's own effects
    pub effect_modifier: i32,
    /// Defender AC after inbound effects
    pub target_ac: i32,
    /// Luck the attacker may burn; `None` for attackers who cannot
    pub luck_available: Option<i32>,
}

/// Classification of a swing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingOutcome {
    Hit { critical: bool },
    Miss,
    Fumble,
    /// A miss close enough that burning Luck could turn it into a hit
    NearMiss { shortfall: i32 },
}

/// Result of an attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swing {
    /// The d20 roll
    pub raw: u32,
    pub ability_modifier: i32,
    pub effect_modifier: i32,
    /// Total attack value
    pub total: i32,
    /// Target's effective AC
    pub target_ac: i32,
    pub outcome: SwingOutcome,
}

impl Swing {
    /// Whether the attack hit
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, SwingOutcome::Hit { .. })
    }

    /// Whether it was a critical hit
    pub fn is_critical(&self) -> bool {
        matches!(self.outcome, SwingOutcome::Hit { critical: true })
    }

    /// Whether it was a fumble
    pub fn is_fumble(&self) -> bool {
        self.outcome == SwingOutcome::Fumble
    }

    /// How far the total fell short of the AC (0 on a hit)
    pub fn shortfall(&self) -> i32 {
        (self.target_ac - self.total).max(0)
    }

    /// "14 +1 -2 = 13", for the log
    pub fn describe_roll(&self) -> String {
        let mut text = self.raw.to_string();
        if self.ability_modifier != 0 {
            text.push_str(&format!(" {:+}", self.ability_modifier));
        }
        if self.effect_modifier != 0 {
            text.push_str(&format!(" {:+}", self.effect_modifier));
        }
        if self.ability_modifier != 0 || self.effect_modifier != 0 {
            text.push_str(&format!(" = {}", self.total));
        }
        text
    }
}

/// Classify a roll. Natural 1 always misses; natural 20 always hits.
pub fn classify(raw: u32, total: i32, target_ac: i32) -> SwingOutcome {
    if is_fumble(raw) {
        SwingOutcome::Fumble
    } else if is_critical(raw) {
        SwingOutcome::Hit { critical: true }
    } else if total >= target_ac {
        SwingOutcome::Hit { critical: false }
    } else {
        SwingOutcome::Miss
    }
}

/// Evaluate a known d20 face against a setup
pub fn evaluate_swing(raw: u32, setup: &SwingSetup) -> Swing {
    let total = (raw as i32)
        .saturating_add(setup.ability_modifier)
        .saturating_add(setup.effect_modifier);
    let mut outcome = classify(raw, total, setup.target_ac);

    if outcome == SwingOutcome::Miss {
        let shortfall = setup.target_ac - total;
        if let Some(luck) = setup.luck_available {
            if shortfall <= luck {
                outcome = SwingOutcome::NearMiss { shortfall };
            }
        }
    }

    Swing {
        raw,
        ability_modifier: setup.ability_modifier,
        effect_modifier: setup.effect_modifier,
        total,
        target_ac: setup.target_ac,
        outcome,
    }
}

/// Roll a d20 and evaluate it
pub fn roll_swing<D: DieRoller + ?Sized>(setup: &SwingSetup, roller: &mut D) -> Swing {
    let raw = roll_d20(roller);
    let swing = evaluate_swing(raw, setup);
    debug!(raw, total = swing.total, ac = swing.target_ac, outcome = ?swing.outcome, "swing");
    swing
}

/// Damage for a landed hit: doubled dice on a critical, halved on request
pub fn hit_damage<D: DieRoller + ?Sized>(
    expression: Option<&str>,
    critical: bool,
    halve: bool,
    roller: &mut D,
) -> DamageRoll {
    let mut damage = if critical {
        roll_critical_damage(expression, roller)
    } else {
        roll_damage(expression, roller)
    };
    if halve {
        damage.halve();
    }
    damage
}
