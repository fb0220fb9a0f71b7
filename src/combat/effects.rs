//! Status effects system
//!
//! Each combatant carries an [`EffectLedger`] of short-lived modifiers:
//! - Attack bonus / penalty on the owner's own next rolls
//! - Exposure: a bonus granted to whoever attacks the owner
//! - Half damage on the owner's next hits
//! - Skip next action
//!
//! Nothing decays in the background. A modifier is spent only when the step
//! that consults it runs, which decrements its remaining uses.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kinds of effect a ledger can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Added to an attack roll
    AttackBonus,
    /// Subtracted from an attack roll
    AttackPenalty,
    /// Outgoing damage is halved
    HalfDamage,
    /// The owner's next action is lost
    SkipNextAction,
}

/// Whose rolls an attack modifier applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// The owner's own attack rolls
    Own,
    /// Attack rolls made against the owner
    Inbound,
}

/// A status effect instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    /// Size of the modifier (always positive; the kind carries the sign)
    pub magnitude: i32,
    pub facing: Facing,
    /// Number of rolls this effect still applies to
    pub uses_remaining: u32,
    /// What caused it, for the combat log
    pub source: String,
}

impl Effect {
    /// Create a new effect
    pub fn new(kind: EffectKind, magnitude: i32, facing: Facing, uses: u32) -> Self {
        Self {
            kind,
            magnitude,
            facing,
            uses_remaining: uses,
            source: String::new(),
        }
    }

    /// Set the source of this effect
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    /// Signed contribution to an attack total
    pub fn attack_value(&self) -> i32 {
        match self.kind {
            EffectKind::AttackBonus => self.magnitude,
            EffectKind::AttackPenalty => -self.magnitude,
            _ => 0,
        }
    }

    /// Check if effect has been used up
    pub fn is_expired(&self) -> bool {
        self.uses_remaining == 0
    }
}

/// Static description of an effect produced by a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectSpec {
    SkipNextAction,
    AttackPenalty { amount: i32, uses: u32 },
    AttackBonus { amount: i32, uses: u32 },
    /// Attackers gain `bonus` against the owner
    Exposed { bonus: i32, uses: u32 },
    HalfDamage { uses: u32 },
}

impl EffectSpec {
    /// Build the concrete effect
    pub fn instantiate(self, source: &str) -> Effect {
        let effect = match self {
            EffectSpec::SkipNextAction => Effect::new(EffectKind::SkipNextAction, 1, Facing::Own, 1),
            EffectSpec::AttackPenalty { amount, uses } => {
                Effect::new(EffectKind::AttackPenalty, amount, Facing::Own, uses)
            }
            EffectSpec::AttackBonus { amount, uses } => {
                Effect::new(EffectKind::AttackBonus, amount, Facing::Own, uses)
            }
            EffectSpec::Exposed { bonus, uses } => {
                Effect::new(EffectKind::AttackBonus, bonus, Facing::Inbound, uses)
            }
            EffectSpec::HalfDamage { uses } => Effect::new(EffectKind::HalfDamage, 1, Facing::Own, uses),
        };
        effect.with_source(source)
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let uses = self.uses_remaining;
        match (self.kind, self.facing) {
            (EffectKind::SkipNextAction, _) => write!(f, "loses the next action"),
            (EffectKind::HalfDamage, _) => write!(f, "half damage on the next {uses} hit(s)"),
            (EffectKind::AttackBonus, Facing::Own) => {
                write!(f, "+{} to the next {uses} attack(s)", self.magnitude)
            }
            (EffectKind::AttackPenalty, Facing::Own) => {
                write!(f, "-{} to the next {uses} attack(s)", self.magnitude)
            }
            (EffectKind::AttackBonus, Facing::Inbound) => {
                write!(f, "foes gain +{} on the next {uses} attack(s)", self.magnitude)
            }
            (EffectKind::AttackPenalty, Facing::Inbound) => {
                write!(f, "foes suffer -{} on the next {uses} attack(s)", self.magnitude)
            }
        }
    }
}

/// Effects on a single combatant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectLedger {
    effects: Vec<Effect>,
}

impl EffectLedger {
    /// Create new empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect, refreshing an existing one of the same kind and facing
    pub fn add(&mut self, effect: Effect) {
        if effect.is_expired() {
            return;
        }
        if let Some(existing) = self
            .effects
            .iter_mut()
            .find(|e| e.kind == effect.kind && e.facing == effect.facing)
        {
            existing.uses_remaining = existing.uses_remaining.max(effect.uses_remaining);
            existing.magnitude = existing.magnitude.max(effect.magnitude);
            existing.source = effect.source;
        } else {
            self.effects.push(effect);
        }
    }

    /// Check if the ledger holds an effect of this kind
    pub fn has(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind && !e.is_expired())
    }

    /// Sum and spend every attack modifier with the given facing
    pub fn take_attack_modifier(&mut self, facing: Facing) -> i32 {
        let mut total = 0;
        for effect in self.effects.iter_mut().filter(|e| {
            e.facing == facing && matches!(e.kind, EffectKind::AttackBonus | EffectKind::AttackPenalty)
        }) {
            total += effect.attack_value();
            effect.uses_remaining = effect.uses_remaining.saturating_sub(1);
        }
        self.prune();
        if total != 0 {
            debug!(?facing, total, "consumed attack modifier");
        }
        total
    }

    /// Spend one use of half damage, if any
    pub fn take_half_damage(&mut self) -> bool {
        self.take_one(EffectKind::HalfDamage)
    }

    /// Spend a pending skip-next-action, if any
    pub fn take_skip_action(&mut self) -> bool {
        self.take_one(EffectKind::SkipNextAction)
    }

    fn take_one(&mut self, kind: EffectKind) -> bool {
        let Some(effect) = self
            .effects
            .iter_mut()
            .find(|e| e.kind == kind && !e.is_expired())
        else {
            return false;
        };
        effect.uses_remaining -= 1;
        self.prune();
        debug!(?kind, "consumed effect");
        true
    }

    fn prune(&mut self) {
        self.effects.retain(|e| !e.is_expired());
    }

    /// Get all active effects
    pub fn active_effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Whether no effects are active
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Clear all effects
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
