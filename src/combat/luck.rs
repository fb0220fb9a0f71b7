//! Luck negotiation
//!
//! When a character's attack falls short by no more than their current Luck,
//! the encounter pauses and offers the player a choice: accept the miss, or
//! burn Luck point for point to raise the total. Burned Luck is gone until
//! the character rests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::attack::{classify, Swing, SwingOutcome};

/// Errors at the negotiation boundary. None of them change encounter state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("cannot burn {requested} Luck: must be between 1 and {available}")]
    InvalidLuckBurn { requested: i32, available: i32 },

    #[error("no luck decision is pending")]
    NoDecisionPending,
}

/// The player's answer to a luck offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LuckDecision {
    Decline,
    Burn(i32),
}

/// A near-miss held while the player decides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttack {
    pub swing: Swing,
    /// Damage expression of the weapon that swung
    pub weapon_damage: Option<String>,
}

/// What the player is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuckOffer {
    pub raw: u32,
    pub total: i32,
    pub shortfall: i32,
    pub luck_available: i32,
}

impl PendingAttack {
    pub fn offer(&self, luck_available: i32) -> LuckOffer {
        LuckOffer {
            raw: self.swing.raw,
            total: self.swing.total,
            shortfall: self.swing.shortfall(),
            luck_available,
        }
    }
}

/// Resolution of a luck decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnResult {
    Declined,
    Burned {
        spent: i32,
        new_total: i32,
        hit: bool,
        /// Still decided by the natural 20, never by the Luck spent
        critical: bool,
    },
}

/// Validate a decision and compute its result without touching any state
pub fn evaluate_burn(
    pending: &PendingAttack,
    decision: LuckDecision,
    current_luck: i32,
) -> Result<BurnResult, CombatError> {
    let spent = match decision {
        LuckDecision::Decline => return Ok(BurnResult::Declined),
        LuckDecision::Burn(amount) => amount,
    };

    if spent < 1 || spent > current_luck {
        return Err(CombatError::InvalidLuckBurn {
            requested: spent,
            available: current_luck,
        });
    }

    let swing = &pending.swing;
    let new_total = swing.total.saturating_add(spent);
    let outcome = classify(swing.raw, new_total, swing.target_ac);
    Ok(BurnResult::Burned {
        spent,
        new_total,
        hit: matches!(outcome, SwingOutcome::Hit { .. }),
        critical: matches!(outcome, SwingOutcome::Hit { critical: true }),
    })
}
