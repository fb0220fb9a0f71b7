//! Mighty deeds
//!
//! A mighty deed is an attack made while improvising with a trade good. It
//! rolls the usual attack d20 plus an independent d6 deed die, then takes the
//! first matching outcome:
//! 1. natural 1: mighty fumble, whatever the deed die shows
//! 2. natural 20 and a 6: mighty critical
//! 3. hit: ordinary damage, the deed itself does not come off
//! 4. miss: nothing happens

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::attack::{roll_swing, Swing, SwingSetup};
use super::dice::{is_critical, is_fumble, roll_d6, DieRoller};

/// Deed die face that, with a natural 20, makes a mighty critical
pub const DEED_DIE_SUCCESS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeedOutcome {
    MightyFumble,
    MightyCritical,
    /// The attack connects; `deed_die_six` marks a 6 wasted without a natural 20
    Hit { deed_die_six: bool },
    Failed,
}

/// Attack swing plus deed die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeedRoll {
    pub swing: Swing,
    pub deed_die: u32,
    pub outcome: DeedOutcome,
}

/// Classify a deed from the attack and deed dice
pub fn classify_deed(swing: &Swing, deed_die: u32) -> DeedOutcome {
    if is_fumble(swing.raw) {
        DeedOutcome::MightyFumble
    } else if is_critical(swing.raw) && deed_die == DEED_DIE_SUCCESS {
        DeedOutcome::MightyCritical
    } else if swing.is_hit() {
        DeedOutcome::Hit {
            deed_die_six: deed_die == DEED_DIE_SUCCESS,
        }
    } else {
        DeedOutcome::Failed
    }
}

/// Roll the attack die, then the deed die
pub fn roll_deed<D: DieRoller + ?Sized>(setup: &SwingSetup, roller: &mut D) -> DeedRoll {
    // Deeds never open a luck negotiation
    let setup = SwingSetup {
        luck_available: None,
        ..*setup
    };
    let swing = roll_swing(&setup, roller);
    let deed_die = roll_d6(roller);
    let outcome = classify_deed(&swing, deed_die);
    debug!(raw = swing.raw, deed_die, ?outcome, "mighty deed");
    DeedRoll {
        swing,
        deed_die,
        outcome,
    }
}
